//! JSON body extractor with validation through the `validator` crate.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// The body is read as raw bytes so every failure maps onto [`AppError`]:
/// - empty or syntactically broken JSON → `INVALID_JSON` (400)
/// - well-formed JSON of the wrong shape → `BAD_REQUEST` (400)
/// - failing `Validate` rules → `VALIDATION_ERROR` (400), message taken from
///   the first failing rule
///
/// The `Content-Type` header is not inspected.
///
/// ```ignore
/// async fn create_user(ValidatedJson(input): ValidatedJson<CreateUser>) -> impl IntoResponse {
///     // input passed validation
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let data = parse_json::<T>(&bytes)?;
        data.validate()?;

        Ok(ValidatedJson(data))
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        Category::Data => AppError::BadRequest(format!("Invalid request body: {e}")),
        Category::Syntax | Category::Eof | Category::Io => AppError::InvalidJson(e.to_string()),
    })
}
