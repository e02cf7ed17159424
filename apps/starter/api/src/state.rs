//! Shared application state.
//!
//! Holds the configuration and the PostgreSQL pool. `DatabaseConnection` is a
//! cloneable handle, so cloning the state only clones pointers.

use crate::config::Config;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
}
