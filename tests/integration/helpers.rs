//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use jobnest_api::{AppState, build_app};
use jobnest_auth::error::{AuthError, AuthResult};
use jobnest_auth::password::PasswordHasher;
use jobnest_core::config::AppConfig;
use jobnest_core::result::AppResult;
use jobnest_database::{AccountStore, MemoryDatabase};
use jobnest_entity::account::{AccountRole, AccountStatus, NewAccount};
use jobnest_service::{AuthService, EmailDispatcher, FederatedIdentity, IdentityVerifier};

/// Minimal configuration with cheap password hashing.
const TEST_CONFIG: &str = r#"
[database]
url = "postgres://jobnest@localhost/jobnest_test"

[auth]
jwt_secret = "integration-test-secret-0123456789abcdef"

[auth.password_hash]
memory_kib = 1024
iterations = 1
parallelism = 1

[maintenance]
enabled = false
"#;

/// Prefix the stub identity provider accepts, followed by the email.
pub const GOOGLE_CREDENTIAL_PREFIX: &str = "google-ok:";

/// Records every mail instead of sending it.
#[derive(Debug, Default)]
pub struct CapturingMailer {
    verifications: Mutex<Vec<(String, String)>>,
    resets: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    fn last_for(list: &Mutex<Vec<(String, String)>>, to: &str) -> Option<String> {
        list.lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(addr, _)| addr == to)
            .map(|(_, token)| token.clone())
    }

    /// Most recent verification token mailed to `to`.
    pub fn verification_token(&self, to: &str) -> Option<String> {
        Self::last_for(&self.verifications, to)
    }

    /// Most recent reset token mailed to `to`.
    pub fn reset_token(&self, to: &str) -> Option<String> {
        Self::last_for(&self.resets, to)
    }

    /// Number of reset mails sent.
    pub fn reset_count(&self) -> usize {
        self.resets.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailDispatcher for CapturingMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        _valid_for: chrono::Duration,
    ) -> AppResult<()> {
        self.verifications
            .lock()
            .unwrap()
            .push((to.to_string(), token.to_string()));
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        token: &str,
        _valid_for: chrono::Duration,
    ) -> AppResult<()> {
        self.resets
            .lock()
            .unwrap()
            .push((to.to_string(), token.to_string()));
        Ok(())
    }
}

/// Accepts `google-ok:<email>` and rejects everything else.
#[derive(Debug, Default)]
pub struct StubIdentityVerifier;

#[async_trait]
impl IdentityVerifier for StubIdentityVerifier {
    async fn verify(&self, credential: &str) -> AuthResult<FederatedIdentity> {
        let email = credential
            .strip_prefix(GOOGLE_CREDENTIAL_PREFIX)
            .ok_or(AuthError::InvalidToken)?;
        Ok(FederatedIdentity {
            subject: format!("google-{email}"),
            email: email.to_string(),
            name: None,
            picture: None,
        })
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub db: MemoryDatabase,
    /// Captured outbound mail
    pub mailer: Arc<CapturingMailer>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the default test config
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::from_toml_str(TEST_CONFIG).expect("test config");
        adjust(&mut config);

        let db = MemoryDatabase::new();
        let mailer = Arc::new(CapturingMailer::default());
        let auth = AuthService::new(&config.auth, &db.stores(), mailer.clone())
            .expect("auth service");

        let state = AppState::new(config.clone(), auth, Arc::new(StubIdentityVerifier));
        let router = build_app(state);

        Self {
            router,
            db,
            mailer,
            config,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {t}"));
        let headers: Vec<(&str, &str)> = authorization
            .as_deref()
            .map(|value| ("Authorization", value))
            .into_iter()
            .collect();
        self.request_with_headers(method, path, body, &headers).await
    }

    /// Make an HTTP request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Register through the API and return the mailed verification token
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        self.mailer
            .verification_token(email)
            .expect("verification mail sent")
    }

    /// Register and verify, leaving an ACTIVE account
    pub async fn register_active(&self, username: &str, email: &str, password: &str) {
        let token = self.register(username, email, password).await;
        let response = self
            .request(
                "POST",
                "/api/auth/verify-email",
                Some(serde_json::json!({ "token": token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    /// Login and return (access token, refresh token)
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        (
            response.data_str("accessToken").to_string(),
            response.data_str("refreshToken").to_string(),
        )
    }

    /// Insert an ACTIVE administrator directly into the store
    pub async fn create_admin(&self, username: &str, email: &str, password: &str) -> Uuid {
        let hasher = PasswordHasher::new(&self.config.auth.password_hash).expect("hasher");
        let account = self
            .db
            .stores()
            .accounts
            .create(NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hasher.hash_password(password).expect("hash"),
                role: AccountRole::Admin,
                status: AccountStatus::Active,
                avatar_url: None,
            })
            .await
            .expect("Failed to create admin");
        account.id
    }

    /// Look up an account id by email
    pub async fn account_id(&self, email: &str) -> Uuid {
        self.db
            .stores()
            .accounts
            .find_by_email(email)
            .await
            .expect("lookup")
            .expect("account exists")
            .id
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// A string field of `data`, or "" when absent
    pub fn data_str(&self, field: &str) -> &str {
        self.body["data"][field].as_str().unwrap_or_default()
    }

    /// The machine-readable error code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
