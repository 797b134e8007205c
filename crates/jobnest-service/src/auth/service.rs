//! Registration, login, token refresh, password flows and account status.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use jobnest_auth::error::{AuthError, AuthResult};
use jobnest_auth::jwt::{JwtDecoder, JwtEncoder};
use jobnest_auth::password::{PasswordHasher, PasswordValidator};
use jobnest_auth::session::{ClientInfo, RefreshTokenLedger};
use jobnest_auth::verification::OneTimeTokenIssuer;
use jobnest_core::config::{AuthConfig, UnknownEmailPolicy};
use jobnest_database::store::{AccountStore, ProfileUpdate, StoreSet, TokenEffect};
use jobnest_entity::account::{Account, AccountRole, AccountStatus, AccountSummary, NewAccount};

use super::types::{LoginResult, NewRegistration, RefreshResult, Registration};
use crate::identity::FederatedIdentity;
use crate::mail::EmailDispatcher;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 50;

/// Attempts at generating a free username for a federated account.
const FEDERATED_USERNAME_ATTEMPTS: usize = 3;

/// Hex characters appended to a federated username.
const FEDERATED_SUFFIX_LENGTH: usize = 6;

/// Orchestrates the account identity lifecycle.
///
/// The only component that changes an account's status or password hash.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    ledger: Arc<RefreshTokenLedger>,
    verifications: OneTimeTokenIssuer,
    resets: OneTimeTokenIssuer,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    mailer: Arc<dyn EmailDispatcher>,
    auto_activate: bool,
    reset_unknown_email: UnknownEmailPolicy,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("auto_activate", &self.auto_activate)
            .field("reset_unknown_email", &self.reset_unknown_email)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Wires the service from configuration, stores and a mail dispatcher.
    pub fn new(
        config: &AuthConfig,
        stores: &StoreSet,
        mailer: Arc<dyn EmailDispatcher>,
    ) -> AuthResult<Self> {
        let encoder = Arc::new(JwtEncoder::new(config));
        let ledger = Arc::new(RefreshTokenLedger::new(
            stores.refresh_tokens.clone(),
            encoder.clone(),
        ));

        Ok(Self {
            accounts: stores.accounts.clone(),
            decoder: Arc::new(JwtDecoder::new(config)),
            encoder,
            ledger,
            verifications: OneTimeTokenIssuer::email_verification(
                stores.one_time_tokens.clone(),
                config,
            ),
            resets: OneTimeTokenIssuer::password_reset(stores.one_time_tokens.clone(), config),
            hasher: Arc::new(PasswordHasher::new(&config.password_hash)?),
            validator: PasswordValidator::new(config),
            mailer,
            auto_activate: config.auto_activate,
            reset_unknown_email: config.reset_unknown_email,
        })
    }

    /// Token verifier shared with the request gate.
    pub fn decoder(&self) -> Arc<JwtDecoder> {
        self.decoder.clone()
    }

    /// Refresh token ledger shared with the maintenance sweep.
    pub fn ledger(&self) -> Arc<RefreshTokenLedger> {
        self.ledger.clone()
    }

    /// Account store shared with the request gate.
    pub fn accounts(&self) -> Arc<dyn AccountStore> {
        self.accounts.clone()
    }

    // ── Registration ───────────────────────────────────────────────

    /// Registers a new account and mails a verification link.
    pub async fn register(&self, req: NewRegistration) -> AuthResult<Registration> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_string();
        validate_username(&username)?;
        validate_email(&email)?;

        let role = req.role.unwrap_or_default();
        if role.is_admin() {
            return Err(AuthError::Validation(
                "Administrator accounts cannot be self-registered".into(),
            ));
        }
        self.validator.validate(&req.password)?;

        if self.accounts.exists_by_email(&email).await? {
            return Err(AuthError::DuplicateEmail);
        }
        if self.accounts.exists_by_username(&username).await? {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = self.hasher.hash(&req.password).await?;
        let status = if self.auto_activate {
            AccountStatus::Active
        } else {
            AccountStatus::Pending
        };

        // The unique indexes still reject a concurrent duplicate here.
        let account = self
            .accounts
            .create(NewAccount {
                username,
                email,
                password_hash,
                role,
                status,
                avatar_url: None,
            })
            .await?;

        let token = self.verifications.issue(account.id).await?;
        self.dispatch_verification(&account.email, &token.token).await;

        info!(account_id = %account.id, role = %account.role, status = %account.status, "Account registered");

        Ok(Registration {
            account: account.summary(),
            verification_token: token.token,
        })
    }

    // ── Login / logout ─────────────────────────────────────────────

    /// Authenticates with email and password.
    ///
    /// Unknown email and wrong password fail identically with
    /// `InvalidCredentials`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> AuthResult<LoginResult> {
        let Some(account) = self.accounts.find_by_email(email.trim()).await? else {
            self.hasher.verify_dummy_blocking(password).await;
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &account.password_hash).await? {
            warn!(account_id = %account.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        ensure_can_login(&account)?;
        let result = self.start_session(account, client).await?;
        info!(account_id = %result.account.id, "Login successful");
        Ok(result)
    }

    /// Signs in with an identity verified by an external provider.
    ///
    /// An existing account with the same email is reused; otherwise an
    /// active account is created with a generated username and a random
    /// password. A PENDING account is activated and its registration
    /// password replaced with a random one.
    pub async fn login_federated(
        &self,
        identity: FederatedIdentity,
        requested_role: Option<AccountRole>,
        client: ClientInfo,
    ) -> AuthResult<LoginResult> {
        let account = match self.accounts.find_by_email(&identity.email).await? {
            Some(existing) => match existing.status {
                AccountStatus::Blocked => return Err(AuthError::AccountBlocked),
                AccountStatus::Pending => self.claim_pending_account(existing).await?,
                AccountStatus::Active => existing,
            },
            None => self.create_federated_account(&identity, requested_role).await?,
        };

        let result = self.start_session(account, client).await?;
        info!(account_id = %result.account.id, "Federated login successful");
        Ok(result)
    }

    /// Exchanges a recorded refresh token for a new access token.
    ///
    /// The refresh token itself is returned unchanged.
    pub async fn refresh(&self, raw_refresh_token: &str) -> AuthResult<RefreshResult> {
        if !self.ledger.validate(raw_refresh_token).await? {
            return Err(AuthError::InvalidToken);
        }
        let claims = self.decoder.verify_refresh(raw_refresh_token)?;

        // Current role, not the one at issuance.
        let account = self
            .accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        ensure_can_login(&account)?;

        let access_token =
            self.encoder
                .issue_access_token(claims.sub, &claims.email, account.role)?;

        Ok(RefreshResult {
            access_token,
            refresh_token: raw_refresh_token.to_string(),
        })
    }

    /// Revokes one refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, raw_refresh_token: &str) -> AuthResult<()> {
        self.ledger.revoke(raw_refresh_token).await?;
        Ok(())
    }

    /// Removes every refresh token of the account.
    pub async fn logout_all(&self, account_id: Uuid) -> AuthResult<u64> {
        Ok(self.ledger.revoke_all_for_account(account_id).await?)
    }

    // ── Passwords ──────────────────────────────────────────────────

    /// Changes the password after checking the current one.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let account = self.load(account_id).await?;

        if !self.hasher.verify(old_password, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }
        self.validator.validate(new_password)?;
        self.validator.validate_not_same(old_password, new_password)?;

        let hash = self.hasher.hash(new_password).await?;
        self.accounts.update_password(account_id, &hash).await?;

        info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    /// Issues a password reset token and mails it.
    ///
    /// Returns the issued token, or `None` when the email is unknown and the
    /// configured policy is to ignore it.
    pub async fn send_password_reset(&self, email: &str) -> AuthResult<Option<String>> {
        let Some(account) = self.accounts.find_by_email(email.trim()).await? else {
            return match self.reset_unknown_email {
                UnknownEmailPolicy::Reject => Err(AuthError::AccountNotFound),
                UnknownEmailPolicy::Ignore => {
                    info!("Password reset requested for an unknown email");
                    Ok(None)
                }
            };
        };

        let token = self.resets.issue(account.id).await?;
        if let Err(e) = self
            .mailer
            .send_password_reset_email(&account.email, &token.token, self.resets.ttl())
            .await
        {
            warn!(account_id = %account.id, error = %e, "Failed to send password reset email");
        }

        info!(account_id = %account.id, "Password reset requested");
        Ok(Some(token.token))
    }

    /// Consumes a reset token and overwrites the password in one step.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<()> {
        self.resets.check(token).await?;
        self.validator.validate(new_password)?;
        let hash = self.hasher.hash(new_password).await?;

        let account = self
            .resets
            .consume(token, TokenEffect::SetPasswordHash(hash))
            .await?;

        info!(account_id = %account.id, "Password reset");
        Ok(())
    }

    // ── Email verification ─────────────────────────────────────────

    /// Consumes a verification token and activates a pending account.
    pub async fn verify_email(&self, token: &str) -> AuthResult<AccountSummary> {
        let account = self
            .verifications
            .consume(token, TokenEffect::ActivateAccount)
            .await?;

        info!(account_id = %account.id, status = %account.status, "Email verified");
        Ok(account.summary())
    }

    /// Issues and mails a fresh verification token to a pending account.
    pub async fn resend_verification(&self, account_id: Uuid) -> AuthResult<String> {
        let account = self.load(account_id).await?;
        if account.status != AccountStatus::Pending {
            return Err(AuthError::Validation("Email is already verified".into()));
        }

        let token = self.verifications.issue(account.id).await?;
        self.dispatch_verification(&account.email, &token.token).await;
        Ok(token.token)
    }

    /// Resends verification by email. Pending accounts cannot authenticate,
    /// so the public endpoint identifies them this way.
    pub async fn resend_verification_to(&self, email: &str) -> AuthResult<String> {
        let account = self
            .accounts
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::AccountNotFound)?;
        self.resend_verification(account.id).await
    }

    // ── Profile and status ─────────────────────────────────────────

    /// Returns the account profile.
    pub async fn get_account(&self, account_id: Uuid) -> AuthResult<AccountSummary> {
        Ok(self.load(account_id).await?.summary())
    }

    /// Updates username and/or avatar.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        update: ProfileUpdate,
    ) -> AuthResult<AccountSummary> {
        let account = self.load(account_id).await?;

        let username = match update.username {
            Some(name) => {
                let name = name.trim().to_string();
                validate_username(&name)?;
                if let Some(other) = self.accounts.find_by_username(&name).await? {
                    if other.id != account.id {
                        return Err(AuthError::DuplicateUsername);
                    }
                }
                Some(name)
            }
            None => None,
        };

        let updated = self
            .accounts
            .update_profile(
                account.id,
                ProfileUpdate {
                    username,
                    avatar_url: update.avatar_url,
                },
            )
            .await?;

        info!(account_id = %account_id, "Profile updated");
        Ok(updated.summary())
    }

    /// Blocks the account. Privileged; the caller checks the capability.
    pub async fn block(&self, account_id: Uuid) -> AuthResult<AccountSummary> {
        self.set_status(account_id, AccountStatus::Blocked).await
    }

    /// Re-activates a blocked account. Privileged; the caller checks the
    /// capability.
    pub async fn unblock(&self, account_id: Uuid) -> AuthResult<AccountSummary> {
        self.set_status(account_id, AccountStatus::Active).await
    }

    // ── Helpers ────────────────────────────────────────────────────

    async fn load(&self, account_id: Uuid) -> AuthResult<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    async fn set_status(&self, account_id: Uuid, status: AccountStatus) -> AuthResult<AccountSummary> {
        self.load(account_id).await?;
        let account = self.accounts.update_status(account_id, status).await?;
        info!(account_id = %account_id, status = %status, "Account status changed");
        Ok(account.summary())
    }

    async fn start_session(&self, mut account: Account, client: ClientInfo) -> AuthResult<LoginResult> {
        let now = Utc::now();
        self.accounts.update_last_login(account.id, now).await?;
        account.last_login_at = Some(now);

        let access_token =
            self.encoder
                .issue_access_token_at(account.id, &account.email, account.role, now)?;
        let refresh = self.ledger.create_at(&account, client, now).await?;

        Ok(LoginResult {
            access_token,
            refresh_token: refresh.raw,
            account: account.summary(),
        })
    }

    /// Activates a PENDING account whose address the provider verified. The
    /// registration password is replaced in the same store call.
    async fn claim_pending_account(&self, account: Account) -> AuthResult<Account> {
        let password_hash = self.random_password_hash().await?;
        match self.accounts.activate_pending(account.id, &password_hash).await? {
            Some(activated) => {
                warn!(account_id = %activated.id, "Pending account activated by federated sign-in; registration password discarded");
                Ok(activated)
            }
            // Status changed since the lookup.
            None => {
                let current = self.load(account.id).await?;
                ensure_can_login(&current)?;
                Ok(current)
            }
        }
    }

    async fn random_password_hash(&self) -> AuthResult<String> {
        self.hasher.hash(&Uuid::new_v4().to_string()).await.map_err(AuthError::from)
    }

    async fn create_federated_account(
        &self,
        identity: &FederatedIdentity,
        requested_role: Option<AccountRole>,
    ) -> AuthResult<Account> {
        let role = match requested_role {
            Some(AccountRole::Employer) => AccountRole::Employer,
            _ => AccountRole::Candidate,
        };
        let password_hash = self.random_password_hash().await?;
        let base = federated_username_base(&identity.email);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let suffix = Uuid::new_v4().simple().to_string();
            let username = format!("{base}_{}", &suffix[..FEDERATED_SUFFIX_LENGTH]);
            validate_username(&username)?;

            let created = self
                .accounts
                .create(NewAccount {
                    username,
                    email: identity.email.clone(),
                    password_hash: password_hash.clone(),
                    role,
                    status: AccountStatus::Active,
                    avatar_url: identity.picture.clone(),
                })
                .await
                .map_err(AuthError::from);

            match created {
                Err(AuthError::DuplicateUsername) if attempt < FEDERATED_USERNAME_ATTEMPTS => {
                    continue;
                }
                Ok(account) => {
                    info!(account_id = %account.id, role = %account.role, "Federated account created");
                    return Ok(account);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch_verification(&self, email: &str, token: &str) {
        if let Err(e) = self
            .mailer
            .send_verification_email(email, token, self.verifications.ttl())
            .await
        {
            warn!(error = %e, "Failed to send verification email");
        }
    }
}

/// Only ACTIVE accounts may authenticate.
fn ensure_can_login(account: &Account) -> AuthResult<()> {
    match account.status {
        AccountStatus::Active => Ok(()),
        AccountStatus::Blocked => Err(AuthError::AccountBlocked),
        AccountStatus::Pending => Err(AuthError::AccountPending),
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Email local part reduced to username characters, short enough to take
/// the `_xxxxxx` suffix.
fn federated_username_base(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or_default();
    let base: String = local_part
        .chars()
        .filter(|c| is_username_char(*c))
        .take(MAX_USERNAME_LENGTH - FEDERATED_SUFFIX_LENGTH - 1)
        .collect();
    if base.is_empty() { "user".to_string() } else { base }
}

fn validate_username(username: &str) -> AuthResult<()> {
    let length = username.chars().count();
    if length < 3 || length > MAX_USERNAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Username must be between 3 and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username.chars().all(is_username_char) {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits, '_', '-' and '.'".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AuthError::Validation("Invalid email format".into())),
    }
}
