//! Account mail templates.

use chrono::Duration;
use serde::Serialize;

/// A rendered plain-text mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

impl MailMessage {
    /// Email verification mail linking to `{app_url}/verify-email?token=…`.
    pub fn verification(from: &str, to: &str, app_url: &str, token: &str, valid_for: Duration) -> Self {
        let link = format!("{}/verify-email?token={token}", app_url.trim_end_matches('/'));
        let validity = describe_validity(valid_for);
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Verify your JobNest email".to_string(),
            text: format!(
                "Welcome to JobNest!\n\nPlease verify your email address by opening the link below:\n{link}\n\nThe link expires in {validity}."
            ),
        }
    }

    /// Password reset mail linking to `{app_url}/reset-password?token=…`.
    pub fn password_reset(from: &str, to: &str, app_url: &str, token: &str, valid_for: Duration) -> Self {
        let link = format!("{}/reset-password?token={token}", app_url.trim_end_matches('/'));
        let validity = describe_validity(valid_for);
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Reset your JobNest password".to_string(),
            text: format!(
                "We received a request to reset your password.\n\nOpen the link below to choose a new one:\n{link}\n\nThe link expires in {validity}. If you did not request this, ignore this email."
            ),
        }
    }
}

/// "1 hour", "24 hours", "30 minutes".
fn describe_validity(valid_for: Duration) -> String {
    let hours = valid_for.num_hours();
    if hours >= 1 && valid_for == Duration::hours(hours) {
        return plural(hours, "hour");
    }
    plural(valid_for.num_minutes().max(1), "minute")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
