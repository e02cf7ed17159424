use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, SqlErr, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Round-trip `SELECT 1` to prove the pool can reach the server
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}

/// Whether `err` was raised by a unique index or constraint.
///
/// A `SqlErr` only comes out of a live driver error, so the positive case is
/// covered against a real server in `domain_users`' PostgreSQL tests.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
