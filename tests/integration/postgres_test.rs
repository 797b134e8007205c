//! Integration tests against a real PostgreSQL database.
//!
//! Set `DATABASE_URL` to a scratch database to run them; without it every
//! test returns early. Rows are keyed by random names, so runs can share a
//! database.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use jobnest_auth::error::AuthError;
use jobnest_auth::jwt::JwtEncoder;
use jobnest_auth::session::{ClientInfo, RefreshTokenLedger};
use jobnest_core::config::{AuthConfig, DatabaseConfig, MailConfig, PasswordHashConfig};
use jobnest_core::error::codes;
use jobnest_database::{
    AccountStore, ConsumeOutcome, DatabasePool, OneTimeTokenStore, StoreSet, TokenEffect,
};
use jobnest_entity::account::{Account, AccountRole, AccountStatus, NewAccount};
use jobnest_entity::token::TokenPurpose;
use jobnest_service::{AuthService, LogMailer, NewRegistration};

async fn connect() -> Option<DatabasePool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 10,
        min_connections: 0,
        acquire_timeout_seconds: 10,
        idle_timeout_seconds: 0,
        run_migrations: true,
    };
    let db = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    Some(db)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..12])
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "postgres-test-secret".into(),
        password_hash: PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..AuthConfig::default()
    }
}

async fn insert_account(stores: &StoreSet, status: AccountStatus) -> Account {
    let name = unique("u");
    stores
        .accounts
        .create(NewAccount {
            username: name.clone(),
            email: format!("{name}@example.com"),
            password_hash: "original-hash".into(),
            role: AccountRole::Candidate,
            status,
            avatar_url: None,
        })
        .await
        .expect("Failed to create account")
}

#[tokio::test]
async fn test_unique_indexes_map_to_duplicate_codes() {
    let Some(db) = connect().await else { return };
    let stores = db.stores();
    let existing = insert_account(&stores, AccountStatus::Active).await;

    let err = stores
        .accounts
        .create(NewAccount {
            username: unique("other"),
            email: existing.email.to_uppercase(),
            password_hash: "h".into(),
            role: AccountRole::Candidate,
            status: AccountStatus::Pending,
            avatar_url: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(codes::DUPLICATE_EMAIL));

    let err = stores
        .accounts
        .create(NewAccount {
            username: existing.username.to_uppercase(),
            email: format!("{}@example.com", unique("other")),
            password_hash: "h".into(),
            role: AccountRole::Candidate,
            status: AccountStatus::Pending,
            avatar_url: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(codes::DUPLICATE_USERNAME));

    let other = insert_account(&stores, AccountStatus::Active).await;
    let err = stores
        .accounts
        .update_profile(
            other.id,
            jobnest_database::ProfileUpdate {
                username: Some(existing.username.clone()),
                avatar_url: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(codes::DUPLICATE_USERNAME));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_keeps_one_account() {
    let Some(db) = connect().await else { return };
    let service = AuthService::new(
        &auth_config(),
        &db.stores(),
        Arc::new(LogMailer::new(&MailConfig::default())),
    )
    .expect("auth service");
    let email = format!("{}@example.com", unique("race"));

    let mut handles = Vec::new();
    for i in 0..6 {
        let service = service.clone();
        let email = email.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(NewRegistration {
                    username: unique(&format!("race{i}_")),
                    email,
                    password: "Sup3rSecret!".into(),
                    role: None,
                })
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateEmail) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_token_is_consumed_once_under_contention() {
    let Some(db) = connect().await else { return };
    let stores = db.stores();
    let account = insert_account(&stores, AccountStatus::Active).await;
    let token = unique("reset-");
    let now = Utc::now();
    stores
        .one_time_tokens
        .insert(TokenPurpose::PasswordReset, account.id, &token, now + Duration::hours(1))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let tokens = stores.one_time_tokens.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            tokens
                .consume(
                    TokenPurpose::PasswordReset,
                    &token,
                    Utc::now(),
                    TokenEffect::SetPasswordHash(format!("hash-{i}")),
                )
                .await
                .unwrap()
        }));
    }

    let mut winner = None;
    for handle in handles {
        match handle.await.unwrap() {
            ConsumeOutcome::Consumed(account) => {
                assert!(winner.is_none(), "token consumed twice");
                winner = Some(account.password_hash);
            }
            ConsumeOutcome::NotFound => {}
            ConsumeOutcome::Expired => panic!("token should not be expired"),
        }
    }

    let winner = winner.expect("one consumer wins");
    let stored = stores.accounts.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, winner);
    assert!(
        stores
            .one_time_tokens
            .find_unused(TokenPurpose::PasswordReset, &token)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_expired_token_is_left_unused() {
    let Some(db) = connect().await else { return };
    let stores = db.stores();
    let account = insert_account(&stores, AccountStatus::Pending).await;
    let token = unique("verify-");
    let now = Utc::now();
    stores
        .one_time_tokens
        .insert(
            TokenPurpose::EmailVerification,
            account.id,
            &token,
            now - Duration::minutes(1),
        )
        .await
        .unwrap();

    let outcome = stores
        .one_time_tokens
        .consume(TokenPurpose::EmailVerification, &token, now, TokenEffect::ActivateAccount)
        .await
        .unwrap();
    assert!(matches!(outcome, ConsumeOutcome::Expired));

    let row = stores
        .one_time_tokens
        .find_unused(TokenPurpose::EmailVerification, &token)
        .await
        .unwrap()
        .expect("expired row stays unused");
    assert!(!row.is_used);

    let stored = stores.accounts.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AccountStatus::Pending);

    // Purposes live in separate tables.
    let outcome = stores
        .one_time_tokens
        .consume(
            TokenPurpose::PasswordReset,
            &token,
            now,
            TokenEffect::SetPasswordHash("x".into()),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, ConsumeOutcome::NotFound));
}

#[tokio::test]
async fn test_activate_pending_is_conditional() {
    let Some(db) = connect().await else { return };
    let stores = db.stores();
    let pending = insert_account(&stores, AccountStatus::Pending).await;
    let blocked = insert_account(&stores, AccountStatus::Blocked).await;

    let activated = stores
        .accounts
        .activate_pending(pending.id, "replaced-hash")
        .await
        .unwrap()
        .expect("pending account activated");
    assert_eq!(activated.status, AccountStatus::Active);
    assert_eq!(activated.password_hash, "replaced-hash");

    assert!(
        stores
            .accounts
            .activate_pending(pending.id, "again")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        stores
            .accounts
            .activate_pending(blocked.id, "x")
            .await
            .unwrap()
            .is_none()
    );
    let still_blocked = stores.accounts.find_by_id(blocked.id).await.unwrap().unwrap();
    assert_eq!(still_blocked.status, AccountStatus::Blocked);
    assert_eq!(still_blocked.password_hash, "original-hash");
}

#[tokio::test]
async fn test_refresh_ledger_round_trip() {
    let Some(db) = connect().await else { return };
    let stores = db.stores();
    let account = insert_account(&stores, AccountStatus::Active).await;
    let ledger = RefreshTokenLedger::new(
        stores.refresh_tokens.clone(),
        Arc::new(JwtEncoder::new(&auth_config())),
    );

    let client = ClientInfo {
        device_info: Some("postgres-test".into()),
        ip_address: Some("2001:db8::7".into()),
    };
    let live = ledger.create(&account, client.clone()).await.unwrap();
    let stale = ledger
        .create_at(&account, client, Utc::now() - Duration::days(30))
        .await
        .unwrap();

    assert!(ledger.validate(&live.raw).await.unwrap());
    assert!(!ledger.validate(&stale.raw).await.unwrap());

    assert!(ledger.sweep_expired(Utc::now()).await.unwrap() >= 1);
    assert!(ledger.validate(&live.raw).await.unwrap());

    ledger.revoke(&live.raw).await.unwrap();
    assert!(!ledger.validate(&live.raw).await.unwrap());
    assert_eq!(ledger.revoke_all_for_account(account.id).await.unwrap(), 1);
}
