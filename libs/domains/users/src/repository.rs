use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::models::{RelationCounts, UpdateUser, User, UserFilter, UserQuery};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage for users.
///
/// Implementations report duplicate emails as
/// [`PersistenceError::UniqueViolation`] and writes against a missing row as
/// [`PersistenceError::RecordNotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> PersistenceResult<User>;

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<User>>;

    /// Exact, case-sensitive match
    async fn get_by_email(&self, email: &str) -> PersistenceResult<Option<User>>;

    /// Matching users, newest first
    async fn list(&self, query: UserQuery) -> PersistenceResult<Vec<User>>;

    async fn count(&self, filter: UserFilter) -> PersistenceResult<u64>;

    /// Apply the provided fields and refresh `updated_at`
    async fn update(&self, id: Uuid, changes: UpdateUser) -> PersistenceResult<User>;

    /// Remove the row, returning its last state
    async fn delete(&self, id: Uuid) -> PersistenceResult<User>;

    async fn relation_counts(&self, id: Uuid) -> PersistenceResult<RelationCounts>;

    async fn count_created_since(&self, since: DateTime<Utc>) -> PersistenceResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    relations: Arc<RwLock<HashMap<Uuid, RelationCounts>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a post against `author_id`
    pub async fn record_post(&self, author_id: Uuid) {
        let mut relations = self.relations.write().await;
        relations.entry(author_id).or_default().posts += 1;
    }

    /// Count a comment against `author_id`
    pub async fn record_comment(&self, author_id: Uuid) {
        let mut relations = self.relations.write().await;
        relations.entry(author_id).or_default().comments += 1;
    }

    fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
        users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> PersistenceResult<User> {
        let mut users = self.users.write().await;

        if Self::email_taken(&users, &user.email, None) {
            return Err(PersistenceError::UniqueViolation);
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> PersistenceResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, query: UserQuery) -> PersistenceResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| u.matches(&query.filter))
            .cloned()
            .collect();

        // Newest first; id breaks ties so pages are stable
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> PersistenceResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.matches(&filter)).count() as u64)
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> PersistenceResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&id) {
            return Err(PersistenceError::RecordNotFound);
        }

        let email_conflict = changes
            .email
            .as_deref()
            .is_some_and(|email| Self::email_taken(&users, email, Some(id)));
        if email_conflict {
            return Err(PersistenceError::UniqueViolation);
        }

        let user = users
            .get_mut(&id)
            .ok_or(PersistenceError::RecordNotFound)?;
        user.apply_update(changes);

        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> PersistenceResult<User> {
        let mut users = self.users.write().await;

        let user = users.remove(&id).ok_or(PersistenceError::RecordNotFound)?;
        self.relations.write().await.remove(&id);

        tracing::info!(user_id = %id, "Deleted user");
        Ok(user)
    }

    async fn relation_counts(&self, id: Uuid) -> PersistenceResult<RelationCounts> {
        let relations = self.relations.read().await;
        Ok(relations.get(&id).copied().unwrap_or_default())
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> PersistenceResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.created_at >= since).count() as u64)
    }
}
