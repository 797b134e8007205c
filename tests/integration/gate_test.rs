//! Integration tests for the request authentication gate.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use helpers::TestApp;

const PASSWORD: &str = "Sup3rSecret!";

async fn status_with_authorization(app: &TestApp, path: &str, authorization: &str) -> StatusCode {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("status"), "ok");
    assert_eq!(response.data_str("database"), "not_configured");

    // A broken token on a public path is ignored.
    let response = app
        .request("GET", "/api/health", None, Some("garbage"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_gate_never_rejects_by_itself() {
    let app = TestApp::new();

    // Allow-listed path without a route: the router answers, not the gate.
    let response = app.request("GET", "/api/jobs/42", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Protected path without a route, with a broken token.
    let response = app
        .request("GET", "/api/nothing-here", None, Some("garbage"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_endpoint_requires_principal() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");

    let response = app
        .request("GET", "/api/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_handling() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (access, _) = app.login("alice@example.com", PASSWORD).await;

    let ok = status_with_authorization(&app, "/api/auth/me", &format!("Bearer {access}")).await;
    assert_eq!(ok, StatusCode::OK);

    let lower = status_with_authorization(&app, "/api/auth/me", &format!("bearer {access}")).await;
    assert_eq!(lower, StatusCode::OK);

    let basic = status_with_authorization(&app, "/api/auth/me", &format!("Basic {access}")).await;
    assert_eq!(basic, StatusCode::UNAUTHORIZED);

    let bare = status_with_authorization(&app, "/api/auth/me", &access).await;
    assert_eq!(bare, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (_, refresh) = app.login("alice@example.com", PASSWORD).await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&refresh))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_elsewhere_is_ignored() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;

    let other = TestApp::with_config(|c| c.auth.jwt_secret = "another-deployment-secret".into());
    other
        .register_active("alice", "alice@example.com", PASSWORD)
        .await;
    let (foreign, _) = other.login("alice@example.com", PASSWORD).await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&foreign))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blocked_account_loses_access_immediately() {
    let app = TestApp::new();
    app.create_admin("admin", "admin@example.com", PASSWORD).await;
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (alice_access, _) = app.login("alice@example.com", PASSWORD).await;
    let (admin_access, _) = app.login("admin@example.com", PASSWORD).await;
    let alice_id = app.account_id("alice@example.com").await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&alice_access))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            &format!("/api/accounts/block/{alice_id}"),
            None,
            Some(&admin_access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The access token is still well-formed and unexpired.
    let response = app
        .request("GET", "/api/auth/me", None, Some(&alice_access))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
