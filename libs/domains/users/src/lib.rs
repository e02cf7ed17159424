//! Users Domain
//!
//! User CRUD, filtered pagination and statistics over the `users` table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │  Handlers   │     │ UsersClient │  ← HTTP endpoints / typed caller
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, pagination, error remapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Entity    │  ← SeaORM models for users, posts, comments
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router: axum::Router = handlers::router(service);
//! ```

pub mod client;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use client::{ClientError, UsersClient};
pub use error::{PersistenceError, UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, DeleteMode, ListUsersOptions, ListUsersResult, RelationCounts, Role, UpdateUser,
    User, UserDetails, UserFilter, UserStats,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
