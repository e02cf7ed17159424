//! Typed HTTP client for the users API.
//!
//! Mirrors the routes in [`handlers`](crate::handlers) one method per
//! endpoint. Non-2xx responses are decoded into the shared error envelope.
//!
//! ```ignore
//! let client = UsersClient::new("http://localhost:8080");
//! let user = client.create(&CreateUser::with_email("ada@example.com")).await?;
//! let page = client.list(&ListUsersOptions::default()).await?;
//! ```

use axum_helpers::{ErrorCode, ErrorResponse};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreateUser, DeleteMode, ListUsersOptions, ListUsersResult, UpdateUser, User, UserDetails,
    UserStats,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API error {status}: {}", body.message)]
    Api {
        status: StatusCode,
        body: ErrorResponse,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct UsersClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsersClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn users_url(&self, suffix: &str) -> String {
        format!("{}/api/users{}", self.base_url, suffix)
    }

    pub async fn list(&self, options: &ListUsersOptions) -> ClientResult<ListUsersResult> {
        let mut query: Vec<(&str, String)> = vec![
            ("page", options.page.to_string()),
            ("limit", options.limit.to_string()),
        ];
        if let Some(search) = &options.search {
            query.push(("search", search.clone()));
        }
        if let Some(role) = options.role {
            query.push(("role", role.to_string()));
        }
        if let Some(is_active) = options.is_active {
            query.push(("isActive", is_active.to_string()));
        }

        let response = self.http.get(self.users_url("")).query(&query).send().await?;
        decode(response).await
    }

    pub async fn create(&self, input: &CreateUser) -> ClientResult<User> {
        let response = self.http.post(self.users_url("")).json(input).send().await?;
        decode(response).await
    }

    pub async fn get(&self, id: Uuid, include_relations: bool) -> ClientResult<UserDetails> {
        let mut request = self.http.get(self.users_url(&format!("/{id}")));
        if include_relations {
            request = request.query(&[("includeRelations", "true")]);
        }
        decode(request.send().await?).await
    }

    pub async fn update(&self, id: Uuid, changes: &UpdateUser) -> ClientResult<User> {
        let response = self
            .http
            .patch(self.users_url(&format!("/{id}")))
            .json(changes)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, id: Uuid, mode: DeleteMode) -> ClientResult<User> {
        let soft = match mode {
            DeleteMode::Soft => "true",
            DeleteMode::Hard => "false",
        };
        let response = self
            .http
            .delete(self.users_url(&format!("/{id}")))
            .query(&[("soft", soft)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn stats(&self) -> ClientResult<UserStats> {
        let response = self.http.get(self.users_url("/stats")).send().await?;
        decode(response).await
    }

    /// Readiness probe; a 503 comes back as `ClientError::Api`
    pub async fn health(&self) -> ClientResult<serde_json::Value> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    let body = serde_json::from_str::<ErrorResponse>(&text)
        .unwrap_or_else(|_| fallback_error(status, text));

    tracing::debug!(%status, error = %body.error, "Users API returned an error");
    Err(ClientError::Api { status, body })
}

/// Envelope for error bodies that are not the standard JSON shape
fn fallback_error(status: StatusCode, text: String) -> ErrorResponse {
    let code = match status {
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::CONFLICT => ErrorCode::Conflict,
        StatusCode::SERVICE_UNAVAILABLE => ErrorCode::ServiceUnavailable,
        s if s.is_server_error() => ErrorCode::InternalError,
        _ => ErrorCode::BadRequest,
    };
    let message = if text.is_empty() {
        code.default_message().to_string()
    } else {
        text
    };
    ErrorResponse::new(code, message)
}
