//! Account self-service and administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use jobnest_database::store::ProfileUpdate;
use jobnest_entity::account::{AccountRole, AccountSummary};

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/accounts/me
pub async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    let account = state.auth.get_account(user.id()).await?;
    Ok(Json(ApiResponse::ok(account)))
}

/// PUT /api/accounts/me
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    let account = state
        .auth
        .update_profile(
            user.id(),
            ProfileUpdate {
                username: req.username,
                avatar_url: req.avatar_url,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(account)))
}

/// PUT /api/accounts/change-password
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

/// POST /api/accounts/block/{id} (admin)
pub async fn block(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    user.require_capability(&[AccountRole::Admin])?;
    let account = state.auth.block(id).await?;
    tracing::info!(admin_id = %user.id(), account_id = %id, "Account blocked");
    Ok(Json(ApiResponse::ok(account)))
}

/// POST /api/accounts/unblock/{id} (admin)
pub async fn unblock(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountSummary>>, ApiError> {
    user.require_capability(&[AccountRole::Admin])?;
    let account = state.auth.unblock(id).await?;
    tracing::info!(admin_id = %user.id(), account_id = %id, "Account unblocked");
    Ok(Json(ApiResponse::ok(account)))
}
