//! Auth handlers: registration, login, tokens, passwords, email verification.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use jobnest_entity::account::{AccountRole, AccountSummary};
use jobnest_service::{LoginResult, NewRegistration, RefreshResult};

use crate::dto::request::{
    ChangePasswordRequest, ForgotPasswordRequest, GoogleVerifyRequest, LoginRequest,
    LogoutRequest, RefreshRequest, RegisterRequest, ResendVerificationRequest,
    ResetPasswordRequest, VerifyEmailRequest,
};
use crate::dto::response::{ApiResponse, LogoutAllResponse, MessageResponse, RegisterResponse};
use crate::error::ApiError;
use crate::extractors::{ClientMeta, CurrentUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let role = req
        .role
        .as_deref()
        .map(str::parse::<AccountRole>)
        .transpose()?;

    let registration = state
        .auth
        .register(NewRegistration {
            username: req.username,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegisterResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            email: registration.account.email,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state.auth.login(&req.email, &req.password, client).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResult>>, ApiError> {
    let result = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if let Some(token) = req.refresh_token.as_deref().filter(|t| !t.is_empty()) {
        state.auth.logout(token).await?;
    }
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<LogoutAllResponse>>, ApiError> {
    let revoked = state.auth.logout_all(user.id()).await?;
    Ok(Json(ApiResponse::ok(LogoutAllResponse {
        message: "Logged out from all devices".to_string(),
        revoked,
    })))
}

/// POST /api/auth/password/forgot
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth.send_password_reset(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "If the email is registered, a reset link has been sent",
    ))))
}

/// POST /api/auth/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset",
    ))))
}

/// POST /api/auth/password/change
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .change_password(user.id(), &req.old_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    let account = state.auth.verify_email(&req.token).await?;
    Ok(Json(ApiResponse::ok(account)))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth.resend_verification_to(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Verification email sent",
    ))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    let account = state.auth.get_account(user.id()).await?;
    Ok(Json(ApiResponse::ok(account)))
}

/// POST /api/auth/google/verify
pub async fn google_verify(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(req): ValidatedJson<GoogleVerifyRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let identity = state.identity.verify(&req.credential).await?;
    // Unrecognized roles fall back to the default for new accounts.
    let role = req.role.as_deref().and_then(|r| r.parse().ok());

    let result = state
        .auth
        .login_federated(identity, role, client)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
