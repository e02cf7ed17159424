//! HTTP middleware: CORS and security headers.
//!
//! ```ignore
//! use axum_helpers::http::{cors_layer_from_origins, security_headers};
//!
//! let cors = cors_layer_from_origins(&config.server.cors_allowed_origins, &environment)?;
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(cors);
//! ```

pub mod cors;
pub mod security;

pub use cors::{CorsError, cors_layer_from_origins, create_cors_layer, create_permissive_cors_layer};
pub use security::security_headers;
