use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CorsError {
    #[error("CORS_ALLOWED_ORIGIN must be set in production")]
    MissingOrigins,

    #[error("Invalid CORS origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// CORS layer for a fixed list of origins.
///
/// Allows the methods the API serves, JSON content headers, and caches
/// preflight responses for an hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin. Development only.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Build the CORS layer from configured origins.
///
/// An empty list is permissive in development and an error in production.
pub fn cors_layer_from_origins(
    origins: &[String],
    environment: &Environment,
) -> Result<CorsLayer, CorsError> {
    if origins.is_empty() {
        if environment.is_production() {
            return Err(CorsError::MissingOrigins);
        }
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(create_permissive_cors_layer());
    }

    let values = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| CorsError::InvalidOrigin {
                    origin: origin.clone(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(origins = ?origins, "CORS configured");
    Ok(create_cors_layer(values))
}
