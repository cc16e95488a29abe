use std::sync::Arc;

use rateboard_core::User;

use crate::backend::{AuthBackend, AuthUser, Session};
use crate::error::AuthError;

/// Auth state for one caller, passed explicitly rather than held globally.
///
/// Built by [`AuthContext::restore`] from a presented token and torn down by
/// [`AuthContext::sign_out`].
pub struct AuthContext {
    backend: Arc<dyn AuthBackend>,
    access_token: Option<String>,
    session: Option<Session>,
    auth_user: Option<AuthUser>,
    user: Option<User>,
}

impl AuthContext {
    #[must_use]
    pub fn anonymous(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            access_token: None,
            session: None,
            auth_user: None,
            user: None,
        }
    }

    /// Rebuilds the context for a caller presenting `access_token`.
    ///
    /// Unknown or expired tokens yield an anonymous context. The `users`
    /// profile is loaded best-effort; a failure there leaves `user()` empty
    /// but keeps the caller authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the backend cannot be reached to validate
    /// the token.
    pub async fn restore(
        backend: Arc<dyn AuthBackend>,
        access_token: Option<&str>,
    ) -> Result<Self, AuthError> {
        let mut context = Self::anonymous(backend);
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Ok(context);
        };
        if !context.backend.enabled() {
            return Ok(context);
        }

        if let Some(auth_user) = context.backend.current_user(token).await? {
            context.user = context.load_profile(token, &auth_user.id).await;
            context.auth_user = Some(auth_user);
            context.access_token = Some(token.to_string());
        }
        Ok(context)
    }

    /// # Errors
    ///
    /// Returns [`AuthError`] when the backend rejects the credentials.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let Some(session) = self.backend.sign_in(email, password).await? else {
            return Ok(());
        };

        self.user = self
            .load_profile(&session.access_token, &session.user.id)
            .await;
        self.auth_user = Some(session.user.clone());
        self.access_token = Some(session.access_token.clone());
        self.session = Some(session);
        Ok(())
    }

    /// Clears the local state, then revokes the token with the backend.
    ///
    /// The context is anonymous afterwards even when revocation fails.
    ///
    /// # Errors
    ///
    /// Returns the backend's revocation error, if any.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        let token = self.access_token.take();
        self.session = None;
        self.auth_user = None;
        self.user = None;

        match token {
            Some(token) => self.backend.sign_out(&token).await,
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_user.is_some()
    }

    #[must_use]
    pub fn auth_user(&self) -> Option<&AuthUser> {
        self.auth_user.as_ref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Session issued by [`AuthContext::sign_in`]; restored contexts only
    /// carry the token.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    async fn load_profile(&self, access_token: &str, user_id: &str) -> Option<User> {
        match self.backend.fetch_profile(access_token, user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load user profile");
                None
            }
        }
    }
}
