use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, DEFAULT_LIMIT, DEFAULT_PAGE, DeleteMode, ListUsersOptions, ListUsersResult,
    RelationCounts, Role, UpdateUser, User, UserDetails, UserStats,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_stats, get_user, update_user, delete_user),
    components(
        schemas(
            User,
            UserDetails,
            RelationCounts,
            Role,
            CreateUser,
            UpdateUser,
            ListUsersResult,
            UserStats
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the user router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/stats", get(get_stats))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// Raw list query; values are checked by hand so malformed input maps to a
/// validation error instead of a plain-text rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
    /// Page size (default 10)
    #[param(value_type = Option<u64>)]
    pub limit: Option<String>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    #[param(value_type = Option<Role>)]
    pub role: Option<String>,
    /// `true` selects active users; any other value selects inactive ones
    #[param(value_type = Option<bool>)]
    pub is_active: Option<String>,
}

impl TryFrom<ListUsersQuery> for ListUsersOptions {
    type Error = UserError;

    fn try_from(query: ListUsersQuery) -> Result<Self, Self::Error> {
        let page = match query.page.as_deref() {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                UserError::invalid("page", "integer", "page must be a positive integer")
            })?,
            None => DEFAULT_PAGE,
        };

        let limit = match query.limit.as_deref() {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                UserError::invalid("limit", "integer", "limit must be a positive integer")
            })?,
            None => DEFAULT_LIMIT,
        };

        let role = query
            .role
            .as_deref()
            .map(Role::from_str)
            .transpose()
            .map_err(|_| {
                UserError::invalid("role", "enum", "role must be one of: user, moderator, admin")
            })?;

        Ok(ListUsersOptions {
            page,
            limit,
            search: query.search.filter(|s| !s.is_empty()),
            role,
            is_active: query.is_active.map(|v| v == "true"),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetUserQuery {
    /// `true` adds `_count` of posts and comments
    #[param(value_type = Option<bool>)]
    pub include_relations: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserQuery {
    /// `false` removes the row; anything else marks the user inactive
    #[param(value_type = Option<bool>)]
    pub soft: Option<String>,
}

impl DeleteUserQuery {
    fn mode(&self) -> DeleteMode {
        match self.soft.as_deref() {
            Some("false") => DeleteMode::Hard,
            _ => DeleteMode::Soft,
        }
    }
}

/// List users with pagination, search and filters
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = ListUsersResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<ListUsersQuery>,
) -> UserResult<Json<ListUsersResult>> {
    let options = ListUsersOptions::try_from(query)?;
    let result = service.list_users(options).await?;
    Ok(Json(result))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Aggregate user counts
#[utoipa::path(
    get,
    path = "/stats",
    tag = TAG,
    responses(
        (status = 200, description = "User statistics", body = UserStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_stats<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<UserStats>> {
    let stats = service.get_stats().await?;
    Ok(Json(stats))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID"),
        GetUserQuery
    ),
    responses(
        (status = 200, description = "User found", body = UserDetails),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    Query(query): Query<GetUserQuery>,
) -> UserResult<Json<UserDetails>> {
    let include_relations = query.include_relations.as_deref() == Some("true");
    let user = service.get_user(id, include_relations).await?;
    Ok(Json(user))
}

/// Update the provided fields of a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(changes): ValidatedJson<UpdateUser>,
) -> UserResult<Json<User>> {
    let user = service.update_user(id, changes).await?;
    Ok(Json(user))
}

/// Soft delete (default) or hard delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID"),
        DeleteUserQuery
    ),
    responses(
        (status = 200, description = "Resulting state of the user", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    Query(query): Query<DeleteUserQuery>,
) -> UserResult<Json<User>> {
    let user = service.delete_user(id, query.mode()).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListUsersQuery {
        let mut q = ListUsersQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => q.page = value,
                "limit" => q.limit = value,
                "search" => q.search = value,
                "role" => q.role = value,
                "isActive" => q.is_active = value,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn test_list_query_defaults() {
        let options = ListUsersOptions::try_from(ListUsersQuery::default()).unwrap();
        assert_eq!(options, ListUsersOptions::default());
    }

    #[test]
    fn test_list_query_parses_values() {
        let options = ListUsersOptions::try_from(query(&[
            ("page", "3"),
            ("limit", "25"),
            ("search", "ada"),
            ("role", "moderator"),
            ("isActive", "true"),
        ]))
        .unwrap();

        assert_eq!(options.page, 3);
        assert_eq!(options.limit, 25);
        assert_eq!(options.search.as_deref(), Some("ada"));
        assert_eq!(options.role, Some(Role::Moderator));
        assert_eq!(options.is_active, Some(true));
    }

    #[test]
    fn test_is_active_is_true_only_for_literal_true() {
        for raw in ["false", "1", "TRUE", ""] {
            let options = ListUsersOptions::try_from(query(&[("isActive", raw)])).unwrap();
            assert_eq!(options.is_active, Some(false), "isActive={raw}");
        }
    }

    #[test]
    fn test_empty_search_is_absent() {
        let options = ListUsersOptions::try_from(query(&[("search", "")])).unwrap();
        assert_eq!(options.search, None);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        for pairs in [[("page", "two")], [("limit", "-1")], [("role", "superuser")]] {
            let err = ListUsersOptions::try_from(query(&pairs)).unwrap_err();
            assert!(matches!(err, UserError::Validation(_)));
        }
    }

    #[test]
    fn test_delete_mode_from_query() {
        let hard = DeleteUserQuery {
            soft: Some("false".into()),
        };
        let soft = DeleteUserQuery {
            soft: Some("true".into()),
        };
        assert_eq!(hard.mode(), DeleteMode::Hard);
        assert_eq!(soft.mode(), DeleteMode::Soft);
        assert_eq!(DeleteUserQuery::default().mode(), DeleteMode::Soft);
    }
}
