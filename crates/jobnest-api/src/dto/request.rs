//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// "CANDIDATE" or "EMPLOYER".
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token to revoke; logout without one is a no-op.
    pub refresh_token: Option<String>,
}

/// Password reset request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    /// Account email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Verification mail resend request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    /// Email of the pending account.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset with a mailed token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Reset token.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Email verification request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    /// Verification token.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Google sign-in request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVerifyRequest {
    /// Google ID token.
    #[validate(length(min = 1, message = "Credential is required"))]
    pub credential: String,
    /// Optional "CANDIDATE" or "EMPLOYER" for new accounts.
    pub role: Option<String>,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Username.
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    /// Avatar URL.
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,
}
