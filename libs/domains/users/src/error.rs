use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

/// Signals raised by a [`UserRepository`](crate::repository::UserRepository).
///
/// The two known conditions are split out so the service can turn them into
/// domain errors without looking at driver messages.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("record not found")]
    RecordNotFound,

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for PersistenceError {
    fn from(err: DbErr) -> Self {
        if database::postgres::is_unique_violation(&err) {
            return PersistenceError::UniqueViolation;
        }
        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => PersistenceError::RecordNotFound,
            other => PersistenceError::Database(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("A user with email '{0}' already exists")]
    Conflict(String),

    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("No user with email '{0}'")]
    EmailNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Anything the service does not recognise, passed through unchanged
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Single-field validation failure
    pub fn invalid(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new(code).with_message(message.into()));
        UserError::Validation(errors)
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Conflict(_) => AppError::Conflict(err.to_string()),
            UserError::NotFound(_) | UserError::EmailNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            UserError::Validation(errors) => AppError::ValidationError(errors),
            UserError::Persistence(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_record_not_updated_is_not_found() {
        assert!(matches!(
            PersistenceError::from(DbErr::RecordNotUpdated),
            PersistenceError::RecordNotFound
        ));
    }

    #[test]
    fn test_other_db_errors_pass_through() {
        let err = PersistenceError::from(DbErr::Custom("disk full".into()));
        assert!(matches!(err, PersistenceError::Database(_)));
    }

    #[test]
    fn test_status_follows_variant() {
        let cases = [
            (UserError::Conflict("a@b.io".into()), StatusCode::CONFLICT),
            (UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (UserError::EmailNotFound("a@b.io".into()), StatusCode::NOT_FOUND),
            (
                UserError::invalid("page", "range", "page must be at least 1"),
                StatusCode::BAD_REQUEST,
            ),
            (
                UserError::Persistence(PersistenceError::Database(DbErr::Custom("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
