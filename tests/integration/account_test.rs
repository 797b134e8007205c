//! Integration tests for account self-service and administration.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use helpers::TestApp;

const PASSWORD: &str = "Sup3rSecret!";

async fn active_user(app: &TestApp, username: &str, email: &str) -> String {
    app.register_active(username, email, PASSWORD).await;
    app.login(email, PASSWORD).await.0
}

#[tokio::test]
async fn test_get_me() {
    let app = TestApp::new();
    let access = active_user(&app, "alice", "alice@example.com").await;

    let response = app
        .request("GET", "/api/accounts/me", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("username"), "alice");
    assert_eq!(response.data_str("role"), "CANDIDATE");
    assert!(response.data()["lastLoginAt"].is_string());
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let access = active_user(&app, "alice", "alice@example.com").await;

    let response = app
        .request(
            "PUT",
            "/api/accounts/me",
            Some(json!({
                "username": "alice.w",
                "avatarUrl": "https://cdn.example.com/alice.png",
            })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("username"), "alice.w");
    assert_eq!(
        response.data_str("avatarUrl"),
        "https://cdn.example.com/alice.png"
    );

    // Keeping one's own username is not a conflict.
    let response = app
        .request(
            "PUT",
            "/api/accounts/me",
            Some(json!({ "username": "alice.w" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile_rejects_taken_username_and_bad_avatar() {
    let app = TestApp::new();
    active_user(&app, "bob", "bob@example.com").await;
    let access = active_user(&app, "alice", "alice@example.com").await;

    let response = app
        .request(
            "PUT",
            "/api/accounts/me",
            Some(json!({ "username": "BOB" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "DUPLICATE_USERNAME");

    let response = app
        .request(
            "PUT",
            "/api/accounts/me",
            Some(json!({ "avatarUrl": "not a url" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password_via_accounts() {
    let app = TestApp::new();
    let access = active_user(&app, "alice", "alice@example.com").await;

    let response = app
        .request(
            "PUT",
            "/api/accounts/change-password",
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "N3w-Password!" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    app.login("alice@example.com", "N3w-Password!").await;
}

#[tokio::test]
async fn test_block_requires_admin() {
    let app = TestApp::new();
    let access = active_user(&app, "alice", "alice@example.com").await;
    active_user(&app, "bob", "bob@example.com").await;
    let bob_id = app.account_id("bob@example.com").await;

    let response = app
        .request(
            "POST",
            &format!("/api/accounts/block/{bob_id}"),
            None,
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");

    let response = app
        .request("POST", &format!("/api/accounts/block/{bob_id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_block_and_unblock() {
    let app = TestApp::new();
    app.create_admin("admin", "admin@example.com", PASSWORD).await;
    let (admin, _) = app.login("admin@example.com", PASSWORD).await;
    app.register_active("bob", "bob@example.com", PASSWORD).await;
    let (_, bob_refresh) = app.login("bob@example.com", PASSWORD).await;
    let bob_id = app.account_id("bob@example.com").await;

    let response = app
        .request(
            "POST",
            &format!("/api/accounts/block/{bob_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("status"), "BLOCKED");

    let login = json!({ "email": "bob@example.com", "password": PASSWORD });
    let response = app
        .request("POST", "/api/auth/login", Some(login.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "ACCOUNT_BLOCKED");

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": bob_refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "ACCOUNT_BLOCKED");

    let response = app
        .request(
            "POST",
            &format!("/api/accounts/unblock/{bob_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("status"), "ACTIVE");

    let response = app
        .request("POST", "/api/auth/login", Some(login), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_block_unknown_account() {
    let app = TestApp::new();
    app.create_admin("admin", "admin@example.com", PASSWORD).await;
    let (admin, _) = app.login("admin@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            &format!("/api/accounts/block/{}", Uuid::new_v4()),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "ACCOUNT_NOT_FOUND");
}
