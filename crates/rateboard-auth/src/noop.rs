use async_trait::async_trait;
use rateboard_core::{User, UserRole};

use crate::backend::{ensure_self_assignable, AuthBackend, AuthUser, Session, SignUpOutcome};
use crate::error::AuthError;

/// Stand-in used when no auth backend is configured.
///
/// Every call succeeds without effect and no session ever exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuth;

#[async_trait]
impl AuthBackend for NoopAuth {
    fn enabled(&self) -> bool {
        false
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Option<Session>, AuthError> {
        Ok(None)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        role: UserRole,
    ) -> Result<SignUpOutcome, AuthError> {
        ensure_self_assignable(role)?;
        Ok(SignUpOutcome::default())
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn current_user(&self, _access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(None)
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn fetch_profile(
        &self,
        _access_token: &str,
        _user_id: &str,
    ) -> Result<Option<User>, AuthError> {
        Ok(None)
    }
}
