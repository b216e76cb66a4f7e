mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use edusys::edusys_db::PgPermissionRepository;
use edusys::router::init_router;
use common::{
    TEST_PASSWORD, create_test_user, generate_unique_email, get, json_request, login, pg_state,
    send, store_grant,
};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_login_returns_bearer_token(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, TEST_PASSWORD).await;

    let app = init_router(pg_state(pool));
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_login_email_is_case_insensitive(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, TEST_PASSWORD).await;

    let app = init_router(pg_state(pool));
    login(app, &email.to_uppercase(), TEST_PASSWORD).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, TEST_PASSWORD).await;
    let state = pg_state(pool);

    let (wrong_status, wrong_body) = send(
        init_router(state.clone()),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "not-the-password" }),
        ),
    )
    .await;

    let (unknown_status, unknown_body) = send(
        init_router(state),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": generate_unique_email(), "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_login_validates_body(pool: PgPool) {
    let app = init_router(pg_state(pool));

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("valid email"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_me_returns_profile_with_permissions(pool: PgPool) {
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email, TEST_PASSWORD).await;
    let repo = PgPermissionRepository::new(pool.clone());
    store_grant(&repo, user_id, &["schools"], &["read"]).await;

    let state = pg_state(pool);
    let token = login(init_router(state.clone()), &email, TEST_PASSWORD).await;

    let (status, body) = send(init_router(state), get("/api/auth/me", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id.to_string());
    assert!(body["user"].get("password").is_none());
    assert_eq!(body["permissions"].as_array().unwrap().len(), 1);
    assert_eq!(body["permissions"][0]["modules"], json!(["schools"]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_me_requires_token(pool: PgPool) {
    let app = init_router(pg_state(pool));

    let (status, body) = send(app, get("/api/auth/me", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");
}
