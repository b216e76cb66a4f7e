mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use edusys::edusys_db::{PermissionRepository, PermissionStore, PgPermissionRepository, StoreError};
use edusys::edusys_models::{PermissionId, UserId};
use edusys::router::init_router;
use common::{
    TEST_PASSWORD, create_test_user, generate_unique_email, get, grant, json_request, login,
    pg_state, send, store_grant,
};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_by_subject_returns_only_owned_records(pool: PgPool) {
    let owner = create_test_user(&pool, &generate_unique_email(), TEST_PASSWORD).await;
    let other = create_test_user(&pool, &generate_unique_email(), TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool);

    store_grant(&repo, owner, &["schools"], &["read"]).await;
    store_grant(&repo, owner, &["students"], &["read", "update"]).await;
    store_grant(&repo, other, &["users"], &["delete"]).await;

    let records = repo.list_by_subject(owner).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|p| p.user_id == owner));

    let none = repo.list_by_subject(UserId::new()).await.unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_update_and_delete_are_visible_to_next_read(pool: PgPool) {
    let owner = create_test_user(&pool, &generate_unique_email(), TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool);

    let mut record = store_grant(&repo, owner, &["schools"], &["read"]).await;
    record.actions = vec!["read".to_string(), "update".to_string()];
    repo.update(record.clone()).await.unwrap();

    let records = repo.list_by_subject(owner).await.unwrap();
    assert_eq!(records[0].actions, vec!["read", "update"]);

    repo.delete(record.id).await.unwrap();
    assert!(repo.list_by_subject(owner).await.unwrap().is_empty());
    assert!(matches!(
        repo.delete(record.id).await,
        Err(StoreError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_missing_record_is_not_found(pool: PgPool) {
    let repo = PgPermissionRepository::new(pool);

    assert!(matches!(
        repo.find_by_id(PermissionId::new()).await,
        Err(StoreError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_save_for_unknown_user_fails(pool: PgPool) {
    let repo = PgPermissionRepository::new(pool);

    let result = repo.save(grant(UserId::new(), &["schools"], &["read"])).await;
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_grant_for_unknown_user_is_unprocessable(pool: PgPool) {
    let email = generate_unique_email();
    let admin = create_test_user(&pool, &email, TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool.clone());
    store_grant(&repo, admin, &["permissions"], &["create"]).await;

    let state = pg_state(pool);
    let token = login(init_router(state.clone()), &email, TEST_PASSWORD).await;

    let (status, body) = send(
        init_router(state),
        json_request(
            "POST",
            "/api/permissions",
            Some(&token),
            json!({
                "user_id": UserId::new(),
                "modules": ["schools"],
                "actions": ["read"],
                "level": "staff",
                "description": "Grant to nobody"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "User does not exist");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_revocation_applies_to_existing_session(pool: PgPool) {
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email, TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool.clone());
    let record = store_grant(&repo, user_id, &["users"], &["read"]).await;

    let state = pg_state(pool);
    let token = login(init_router(state.clone()), &email, TEST_PASSWORD).await;

    let (status, _) = send(init_router(state.clone()), get("/api/users", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    repo.delete(record.id).await.unwrap();

    let (status, body) = send(init_router(state), get("/api/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_user_removes_their_grants(pool: PgPool) {
    let admin_email = generate_unique_email();
    let admin = create_test_user(&pool, &admin_email, TEST_PASSWORD).await;
    let staff = create_test_user(&pool, &generate_unique_email(), TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool.clone());
    store_grant(&repo, admin, &["users"], &["delete"]).await;
    store_grant(&repo, staff, &["schools"], &["read"]).await;

    let state = pg_state(pool);
    let token = login(init_router(state.clone()), &admin_email, TEST_PASSWORD).await;

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/users/{}", staff))
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = send(init_router(state), request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(repo.list_by_subject(staff).await.unwrap().is_empty());
}
