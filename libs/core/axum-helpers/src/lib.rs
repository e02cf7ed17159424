//! # Axum Helpers
//!
//! Shared HTTP plumbing for the API binaries and domain routers.
//!
//! - **[`errors`]**: `AppError` and the `{code, error, message, details}` envelope
//! - **[`extractors`]**: `ValidatedJson` and `UuidPath`
//! - **[`http`]**: CORS and security-header middleware
//! - **[`server`]**: router assembly with API docs, health checks, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, cors);
//! create_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{UuidPath, ValidatedJson};
pub use http::{cors_layer_from_origins, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
