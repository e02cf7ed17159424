use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use crate::entity::{comment, post, user};
use crate::error::PersistenceError;
use crate::models::{RelationCounts, UpdateUser, User, UserFilter, UserQuery};
use crate::repository::{PersistenceResult, UserRepository};

/// SeaORM-backed repository over the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filter: &UserFilter) -> Select<user::Entity> {
        let mut query = user::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(Expr::cust_with_values(
                "(name ILIKE ? OR email ILIKE ?)",
                [pattern.clone(), pattern],
            ));
        }

        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role));
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(user::Column::IsActive.eq(is_active));
        }

        query
    }
}

/// Escape LIKE wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: User) -> PersistenceResult<User> {
        let active_model: user::ActiveModel = new_user.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(user_id = %model.id, email = %model.email, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> PersistenceResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, query: UserQuery) -> PersistenceResult<Vec<User>> {
        let models = Self::filtered(&query.filter)
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: UserFilter) -> PersistenceResult<u64> {
        Ok(Self::filtered(&filter).count(&self.db).await?)
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> PersistenceResult<User> {
        let mut active_model = user::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };

        if let Some(email) = changes.email {
            active_model.email = Set(email);
        }
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(avatar) = changes.avatar {
            active_model.avatar = Set(avatar);
        }
        if let Some(role) = changes.role {
            active_model.role = Set(role);
        }
        if let Some(is_active) = changes.is_active {
            active_model.is_active = Set(is_active);
        }
        if let Some(metadata) = changes.metadata {
            active_model.metadata = Set(metadata);
        }
        active_model.updated_at = Set(Utc::now().into());

        // Zero rows updated surfaces as DbErr::RecordNotUpdated
        let model = active_model.update(&self.db).await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> PersistenceResult<User> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PersistenceError::RecordNotFound)?;

        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(PersistenceError::RecordNotFound);
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(model.into())
    }

    async fn relation_counts(&self, id: Uuid) -> PersistenceResult<RelationCounts> {
        let posts = post::Entity::find()
            .filter(post::Column::AuthorId.eq(id))
            .count(&self.db)
            .await?;
        let comments = comment::Entity::find()
            .filter(comment::Column::AuthorId.eq(id))
            .count(&self.db)
            .await?;

        Ok(RelationCounts { posts, comments })
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> PersistenceResult<u64> {
        Ok(user::Entity::find()
            .filter(user::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?)
    }
}
