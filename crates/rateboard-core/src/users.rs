use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Influencer,
    Company,
    Admin,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Influencer => "influencer",
            UserRole::Company => "company",
            UserRole::Admin => "admin",
        }
    }

    /// Whether a visitor may pick this role for themselves at sign-up.
    #[must_use]
    pub fn is_self_assignable(self) -> bool {
        matches!(self, UserRole::Influencer | UserRole::Company)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "influencer" => Ok(UserRole::Influencer),
            "company" => Ok(UserRole::Company),
            "admin" => Ok(UserRole::Admin),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

/// Row of the `users` profile table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
