//! Client tests: `UsersClient` against a real server on an ephemeral port.

use axum::{Json, Router, http::StatusCode, routing::get};
use domain_users::*;
use serde_json::json;

async fn spawn_server(extra: Router) -> String {
    let service = UserService::new(InMemoryUserRepository::new());
    let app = Router::new()
        .nest("/api/users", handlers::router(service))
        .merge(extra);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_client_crud_round_trip() {
    let client = UsersClient::new(spawn_server(Router::new()).await);

    let created = client
        .create(&CreateUser {
            name: Some("Ada".into()),
            ..CreateUser::with_email("ada@example.com")
        })
        .await
        .unwrap();
    assert_eq!(created.email, "ada@example.com");
    assert!(created.is_active);

    let fetched = client.get(created.id, true).await.unwrap();
    assert_eq!(fetched.user.id, created.id);
    assert_eq!(fetched.count, Some(RelationCounts::default()));

    let updated = client
        .update(
            created.id,
            &UpdateUser {
                role: Some(Role::Admin),
                name: Some(None),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.name, None);

    let soft = client.delete(created.id, DeleteMode::Soft).await.unwrap();
    assert!(!soft.is_active);

    let hard = client.delete(created.id, DeleteMode::Hard).await.unwrap();
    assert_eq!(hard.id, created.id);

    let err = client.get(created.id, false).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_client_list_and_stats() {
    let client = UsersClient::new(spawn_server(Router::new()).await);
    for i in 0..3 {
        client
            .create(&CreateUser::with_email(format!("user{i}@example.com")))
            .await
            .unwrap();
    }

    let page = client
        .list(&ListUsersOptions {
            limit: 2,
            ..ListUsersOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.total, 3);
    assert!(page.has_more);

    let active = client
        .list(&ListUsersOptions {
            is_active: Some(false),
            ..ListUsersOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(active.total, 0);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 3);
}

#[tokio::test]
async fn test_client_decodes_error_envelope() {
    let client = UsersClient::new(spawn_server(Router::new()).await);
    client
        .create(&CreateUser::with_email("dup@example.com"))
        .await
        .unwrap();

    let err = client
        .create(&CreateUser::with_email("dup@example.com"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body.error, "CONFLICT");
        }
        other => panic!("expected API error, got {other:?}"),
    }

    let err = client.create(&CreateUser::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_client_health() {
    let health = Router::new().route(
        "/api/health",
        get(|| async { Json(json!({"status": "ready", "database": "connected"})) }),
    );
    let client = UsersClient::new(spawn_server(health).await);

    let body = client.health().await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_client_health_not_ready() {
    let health = Router::new().route(
        "/api/health",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "not ready", "database": "disconnected"})),
            )
        }),
    );
    let client = UsersClient::new(spawn_server(health).await);

    let err = client.health().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}
