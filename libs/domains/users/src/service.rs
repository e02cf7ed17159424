use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{PersistenceError, UserError, UserResult};
use crate::models::{
    CreateUser, DeleteMode, ListUsersOptions, ListUsersResult, MAX_ROW_BOUND, UpdateUser, User,
    UserDetails, UserFilter, UserQuery, UserStats,
};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a user with role `user` and `isActive = true` unless given
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        input.validate()?;

        let user = User::new(input);
        let email = user.email.clone();

        self.repository
            .create(user)
            .await
            .map_err(|e| match e {
                PersistenceError::UniqueViolation => UserError::Conflict(email),
                other => UserError::Persistence(other),
            })
    }

    pub async fn get_user(&self, id: Uuid, include_relations: bool) -> UserResult<UserDetails> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let count = if include_relations {
            Some(self.repository.relation_counts(id).await?)
        } else {
            None
        };

        Ok(UserDetails { user, count })
    }

    pub async fn get_user_by_email(&self, email: &str) -> UserResult<User> {
        self.repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))
    }

    /// One page of users, newest first, plus the total match count
    pub async fn list_users(&self, options: ListUsersOptions) -> UserResult<ListUsersResult> {
        if options.page < 1 {
            return Err(UserError::invalid("page", "range", "page must be at least 1"));
        }
        if options.limit < 1 {
            return Err(UserError::invalid("limit", "range", "limit must be at least 1"));
        }
        if options.limit > MAX_ROW_BOUND {
            return Err(UserError::invalid("limit", "range", "limit is too large"));
        }
        let offset = (options.page - 1)
            .checked_mul(options.limit)
            .filter(|offset| *offset <= MAX_ROW_BOUND)
            .ok_or_else(|| UserError::invalid("page", "range", "page is out of range"))?;

        let filter = UserFilter {
            search: options.search.filter(|s| !s.is_empty()),
            role: options.role,
            is_active: options.is_active,
        };

        let query = UserQuery {
            filter: filter.clone(),
            offset,
            limit: options.limit,
        };

        let users = self.repository.list(query).await?;
        let total = self.repository.count(filter).await?;

        Ok(ListUsersResult {
            users,
            total,
            has_more: options.page.saturating_mul(options.limit) < total,
        })
    }

    pub async fn update_user(&self, id: Uuid, changes: UpdateUser) -> UserResult<User> {
        changes.validate()?;

        let email = changes.email.clone();
        self.repository
            .update(id, changes)
            .await
            .map_err(|e| remap_write_error(e, id, email))
    }

    /// Soft delete marks the user inactive; hard delete removes the row.
    /// Either way the resulting (or last) state is returned.
    pub async fn delete_user(&self, id: Uuid, mode: DeleteMode) -> UserResult<User> {
        let result = match mode {
            DeleteMode::Soft => {
                let changes = UpdateUser {
                    is_active: Some(false),
                    ..UpdateUser::default()
                };
                self.repository.update(id, changes).await
            }
            DeleteMode::Hard => self.repository.delete(id).await,
        };

        result.map_err(|e| remap_write_error(e, id, None))
    }

    pub async fn get_stats(&self) -> UserResult<UserStats> {
        self.get_stats_at(Local::now()).await
    }

    /// Stats with "this month" taken from the calendar month of `now`
    pub async fn get_stats_at<Tz: TimeZone>(&self, now: DateTime<Tz>) -> UserResult<UserStats> {
        let since = start_of_month(&now);
        let active = UserFilter {
            is_active: Some(true),
            ..UserFilter::default()
        };

        let total_users = self.repository.count(UserFilter::default()).await?;
        let active_users = self.repository.count(active).await?;
        let new_users_this_month = self.repository.count_created_since(since).await?;

        Ok(UserStats {
            total_users,
            active_users,
            new_users_this_month,
        })
    }
}

fn remap_write_error(err: PersistenceError, id: Uuid, email: Option<String>) -> UserError {
    match (err, email) {
        (PersistenceError::RecordNotFound, _) => UserError::NotFound(id),
        (PersistenceError::UniqueViolation, Some(email)) => UserError::Conflict(email),
        (other, _) => UserError::Persistence(other),
    }
}

/// First instant of the calendar month containing `now`, in `now`'s zone
pub fn start_of_month<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let (year, month) = (now.year(), now.month());

    // Midnight may fall in a DST gap; the first valid instant is then an hour later
    tz.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .earliest()
        .or_else(|| tz.with_ymd_and_hms(year, month, 1, 1, 0, 0).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}
