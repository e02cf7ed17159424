//! PostgreSQL repository tests.
//!
//! Each test starts its own container through `test_utils::TestDatabase`, so
//! they are ignored by default. Run with `--ignored` where Docker is available.

use chrono::{Duration, TimeZone, Utc};
use domain_users::*;
use test_utils::assertions::{assert_some, assert_uuid_eq};
use test_utils::{TestDataBuilder, TestDatabase};

fn service(db: &TestDatabase) -> UserService<PgUserRepository> {
    UserService::new(PgUserRepository::new(db.connection()))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_fetch_user() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("pg_create_and_fetch");

    let created = service
        .create_user(CreateUser {
            name: Some(builder.name("user", "main")),
            metadata: Some(serde_json::json!({"plan": "free"})),
            ..CreateUser::with_email(builder.email("main"))
        })
        .await
        .unwrap();
    assert!(created.is_active);
    assert_eq!(created.role, Role::User);

    let fetched = service.get_user(created.id, false).await.unwrap();
    assert_uuid_eq(fetched.user.id, created.id, "fetched by id");
    assert_eq!(fetched.user.metadata, created.metadata);

    let by_email = service.get_user_by_email(&created.email).await.unwrap();
    assert_uuid_eq(by_email.id, created.id, "fetched by email");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_index_surfaces_as_unique_violation() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.create(User::new(CreateUser::with_email("same@example.com")))
        .await
        .unwrap();
    let err = repo
        .create(User::new(CreateUser::with_email("same@example.com")))
        .await
        .unwrap_err();

    assert!(matches!(err, PersistenceError::UniqueViolation));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_is_conflict() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    let first = service
        .create_user(CreateUser::with_email("dup@example.com"))
        .await
        .unwrap();
    let err = service
        .create_user(CreateUser::with_email("dup@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::Conflict(_)));

    let stored = service.get_user_by_email("dup@example.com").await.unwrap();
    assert_uuid_eq(stored.id, first.id, "first row kept");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_search_and_pagination() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    for i in 0..15 {
        service
            .create_user(CreateUser {
                name: Some(format!("Member {i}")),
                ..CreateUser::with_email(format!("member{i}@example.com"))
            })
            .await
            .unwrap();
    }
    service
        .create_user(CreateUser {
            name: Some("100% Real_Name".into()),
            ..CreateUser::with_email("odd@example.com")
        })
        .await
        .unwrap();

    let page = service
        .list_users(ListUsersOptions {
            limit: 2,
            search: Some("MEMBER".into()),
            ..ListUsersOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.total, 15);
    assert!(page.has_more);

    // Wildcards in the term match literally
    let literal = service
        .list_users(ListUsersOptions {
            search: Some("0% real_".into()),
            ..ListUsersOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(literal.total, 1);
    assert_eq!(literal.users[0].email, "odd@example.com");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_delete() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    let user = service
        .create_user(CreateUser::with_email("ada@example.com"))
        .await
        .unwrap();

    let updated = service
        .update_user(
            user.id,
            UpdateUser {
                name: Some(Some("Ada".into())),
                role: Some(Role::Moderator),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name.as_deref(), Some("Ada"));
    assert_eq!(updated.role, Role::Moderator);
    assert!(updated.updated_at >= user.updated_at);

    let err = service
        .update_user(uuid::Uuid::now_v7(), UpdateUser::default())
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::NotFound(_)));

    let soft = service.delete_user(user.id, DeleteMode::Soft).await.unwrap();
    assert!(!soft.is_active);

    service.delete_user(user.id, DeleteMode::Hard).await.unwrap();
    let err = service.get_user(user.id, false).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_relation_counts() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    let user = service
        .create_user(CreateUser::with_email("author@example.com"))
        .await
        .unwrap();
    let post = db.create_post(user.id, "Hello").await;
    db.create_comment(user.id, post, "First").await;
    db.create_comment(user.id, post, "Second").await;

    let details = service.get_user(user.id, true).await.unwrap();
    let count = assert_some(details.count, "relation counts");
    assert_eq!(count, RelationCounts { posts: 1, comments: 2 });
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_stats_month_bound() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let mut old = User::new(CreateUser::with_email("old@example.com"));
    old.created_at = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
    repo.create(old).await.unwrap();

    let mut recent = User::new(CreateUser::with_email("recent@example.com"));
    recent.created_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    repo.create(recent).await.unwrap();

    let mut later = User::new(CreateUser::with_email("later@example.com"));
    later.created_at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap() - Duration::hours(1);
    later.is_active = false;
    repo.create(later).await.unwrap();

    let service = UserService::new(repo);
    let stats = service
        .get_stats_at(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.new_users_this_month, 2);
}
