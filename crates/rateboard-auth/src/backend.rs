use async_trait::async_trait;
use rateboard_core::{User, UserRole};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Identity record returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl AuthUser {
    /// Role recorded at sign-up, if it is one we recognise.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.user_metadata
            .get("role")
            .and_then(serde_json::Value::as_str)
            .and_then(|r| r.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// Result of a sign-up. `session` is `None` when the backend requires email
/// confirmation before the first sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// Operations the application needs from an identity provider.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `false` for stand-ins that never produce sessions; route protection
    /// is skipped entirely when the backend is disabled.
    fn enabled(&self) -> bool {
        true
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    /// Registers an account and records its `users` profile row.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolves the user behind `access_token`; `None` for unknown or
    /// expired tokens.
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<User>, AuthError>;
}

pub(crate) fn ensure_self_assignable(role: UserRole) -> Result<(), AuthError> {
    if role.is_self_assignable() {
        Ok(())
    } else {
        Err(AuthError::RoleNotSelfAssignable(role))
    }
}
