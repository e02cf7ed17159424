//! SeaORM entities for the tables this domain reads.
//!
//! Only `user` is written here; `post` and `comment` exist so relation
//! counts are real queries.

pub mod comment;
pub mod post;
pub mod user;
