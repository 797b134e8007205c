//! Account role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles an account can hold.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "account_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountRole {
    /// Job seeker. Default for self-registration.
    #[default]
    Candidate,
    /// Posts jobs on behalf of a company.
    Employer,
    /// Platform administrator. Never self-registered.
    Admin,
}

impl AccountRole {
    /// Return the role as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "CANDIDATE",
            Self::Employer => "EMPLOYER",
            Self::Admin => "ADMIN",
        }
    }

    /// Capability tag handed to the authorization layer.
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Candidate => "ROLE_CANDIDATE",
            Self::Employer => "ROLE_EMPLOYER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = jobnest_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CANDIDATE" => Ok(Self::Candidate),
            "EMPLOYER" => Ok(Self::Employer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(jobnest_core::AppError::validation(format!(
                "Invalid account role: '{s}'. Expected one of: CANDIDATE, EMPLOYER, ADMIN"
            ))),
        }
    }
}
