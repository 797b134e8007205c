//! Integration tests for registration, login, tokens and passwords.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use jobnest_auth::session::hash_token;
use jobnest_core::config::UnknownEmailPolicy;
use jobnest_database::RefreshTokenStore;
use jobnest_entity::token::TokenPurpose;

use helpers::{GOOGLE_CREDENTIAL_PREFIX, TestApp};

const PASSWORD: &str = "Sup3rSecret!";

#[tokio::test]
async fn test_register_creates_pending_account() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data_str("email"), "alice@example.com");

    let token = app.mailer.verification_token("alice@example.com").unwrap();
    let row = app
        .db
        .one_time_token(TokenPurpose::EmailVerification, &token)
        .await
        .unwrap();
    assert!(!row.is_used);
    assert_eq!(app.db.account_count().await, 1);
}

#[tokio::test]
async fn test_login_requires_verified_email() {
    let app = TestApp::new();
    let token = app.register("alice", "alice@example.com", PASSWORD).await;

    let login = json!({ "email": "alice@example.com", "password": PASSWORD });
    let response = app
        .request("POST", "/api/auth/login", Some(login.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "ACCOUNT_PENDING");

    let response = app
        .request(
            "POST",
            "/api/auth/verify-email",
            Some(json!({ "token": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("status"), "ACTIVE");

    let response = app
        .request("POST", "/api/auth/login", Some(login), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.data_str("accessToken").is_empty());
    assert!(!response.data_str("refreshToken").is_empty());
    assert_eq!(response.data()["account"]["role"], "CANDIDATE");
    assert!(response.data()["account"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_verification_token_is_single_use() {
    let app = TestApp::new();
    let token = app.register("alice", "alice@example.com", PASSWORD).await;
    let body = json!({ "token": token });

    let first = app
        .request("POST", "/api/auth/verify-email", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", "/api/auth/verify-email", Some(body), None)
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error_code(), "TOKEN_INVALID");
}

#[tokio::test]
async fn test_resend_verification() {
    let app = TestApp::new();
    let original = app.register("alice", "alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/resend-verification",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let fresh = app.mailer.verification_token("alice@example.com").unwrap();
    assert_ne!(fresh, original);

    app.request(
        "POST",
        "/api/auth/verify-email",
        Some(json!({ "token": fresh })),
        None,
    )
    .await;

    let response = app
        .request(
            "POST",
            "/api/auth/resend-verification",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = TestApp::new();
    app.register("alice", "alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "DUPLICATE_EMAIL");

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "DUPLICATE_USERNAME");
    assert_eq!(app.db.account_count().await, 1);
}

#[tokio::test]
async fn test_register_rejects_admin_and_bad_input() {
    let app = TestApp::new();

    let cases = [
        json!({ "username": "root", "email": "root@example.com", "password": PASSWORD, "role": "ADMIN" }),
        json!({ "username": "bob", "email": "bob@example.com", "password": PASSWORD, "role": "WIZARD" }),
        json!({ "username": "bob", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "bo", "email": "bob@example.com", "password": PASSWORD }),
        json!({ "username": "bob", "email": "bob@example.com", "password": "short" }),
    ];

    for body in cases {
        let response = app
            .request("POST", "/api/auth/register", Some(body.clone()), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(app.db.account_count().await, 0);
}

#[tokio::test]
async fn test_register_employer_role() {
    let app = TestApp::with_config(|c| c.auth.auto_activate = true);

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "acme",
                "email": "hr@acme.com",
                "password": PASSWORD,
                "role": "employer",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "hr@acme.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["account"]["role"], "EMPLOYER");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "alice@example.com", "password": "Wrong-pass-1" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_refresh_returns_new_access_token() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (_access, refresh) = app.login("alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data_str("refreshToken"), refresh);

    let access = response.data_str("accessToken").to_string();
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data_str("email"), "alice@example.com");
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_garbage() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (access, _refresh) = app.login("alice@example.com", PASSWORD).await;

    for token in [access.as_str(), "not-a-token"] {
        let response = app
            .request(
                "POST",
                "/api/auth/refresh",
                Some(json!({ "refreshToken": token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "INVALID_TOKEN");
    }
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (_access, refresh) = app.login("alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Repeating the logout, or sending none, is harmless.
    for body in [json!({ "refreshToken": refresh }), json!({})] {
        let response = app.request("POST", "/api/auth/logout", Some(body), None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_login_records_only_valid_client_addresses() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let login = json!({ "email": "alice@example.com", "password": PASSWORD });

    let oversized = "x".repeat(300);
    let cases = [
        (oversized.as_str(), None),
        ("198.51.100.20, 10.0.0.1", Some("198.51.100.20")),
    ];
    for (forwarded, expected) in cases {
        let response = app
            .request_with_headers(
                "POST",
                "/api/auth/login",
                Some(login.clone()),
                &[("X-Forwarded-For", forwarded), ("User-Agent", "integration")],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let refresh = response.data_str("refreshToken");
        let row = app
            .db
            .find_by_hash(&hash_token(refresh))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.ip_address.as_deref(), expected);
        assert_eq!(row.device_info.as_deref(), Some("integration"));
    }
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (access, first) = app.login("alice@example.com", PASSWORD).await;
    let (_, second) = app.login("alice@example.com", PASSWORD).await;
    let id = app.account_id("alice@example.com").await;
    assert_eq!(app.db.refresh_token_count(id).await, 2);

    let response = app
        .request("POST", "/api/auth/logout-all", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["revoked"], 2);
    assert_eq!(app.db.refresh_token_count(id).await, 0);

    for refresh in [first, second] {
        let response = app
            .request(
                "POST",
                "/api/auth/refresh",
                Some(json!({ "refreshToken": refresh })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/password/forgot",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = app.mailer.reset_token("alice@example.com").unwrap();

    let reset = json!({ "token": token, "newPassword": "N3w-Password!" });
    let response = app
        .request("POST", "/api/auth/password/reset", Some(reset.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("POST", "/api/auth/password/reset", Some(reset), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "TOKEN_INVALID");

    let old = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("alice@example.com", "N3w-Password!").await;
}

#[tokio::test]
async fn test_password_reset_unknown_email_policy() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/password/forgot",
            Some(json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "ACCOUNT_NOT_FOUND");

    let app = TestApp::with_config(|c| c.auth.reset_unknown_email = UnknownEmailPolicy::Ignore);
    let response = app
        .request(
            "POST",
            "/api/auth/password/forgot",
            Some(json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.mailer.reset_count(), 0);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    app.register_active("alice", "alice@example.com", PASSWORD).await;
    let (access, _) = app.login("alice@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/password/change",
            Some(json!({ "oldPassword": "Wrong-pass-1", "newPassword": "N3w-Password!" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");

    let response = app
        .request(
            "POST",
            "/api/auth/password/change",
            Some(json!({ "oldPassword": PASSWORD, "newPassword": PASSWORD })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/auth/password/change",
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "N3w-Password!" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    app.login("alice@example.com", "N3w-Password!").await;
}

#[tokio::test]
async fn test_google_sign_in_creates_active_account() {
    let app = TestApp::new();
    let credential = format!("{GOOGLE_CREDENTIAL_PREFIX}carol@gmail.com");

    let response = app
        .request(
            "POST",
            "/api/auth/google/verify",
            Some(json!({ "credential": credential, "role": "EMPLOYER" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["account"]["status"], "ACTIVE");
    assert_eq!(response.data()["account"]["role"], "EMPLOYER");
    assert!(
        response.data()["account"]["username"]
            .as_str()
            .unwrap()
            .starts_with("carol_")
    );

    // The second sign-in reuses the account.
    let again = app
        .request(
            "POST",
            "/api/auth/google/verify",
            Some(json!({ "credential": credential })),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.data()["account"]["id"], response.data()["account"]["id"]);
    assert_eq!(app.db.account_count().await, 1);
}

#[tokio::test]
async fn test_google_sign_in_rejects_bad_credential() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/google/verify",
            Some(json!({ "credential": "forged" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_TOKEN");
    assert_eq!(app.db.account_count().await, 0);
}
