//! Doubles shared by the handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rateboard_auth::{AuthBackend, AuthError, AuthUser, Session, SignUpOutcome};
use rateboard_core::{ProfileSnapshot, User, UserRole};
use rateboard_scraper::{BrowserLauncher, BrowserSession, FetchError, ProfileSource};

pub(super) enum Outcome {
    Snapshot(ProfileSnapshot),
    Launch,
    Navigation,
    SelectorTimeout,
    Browser,
    Deadline,
    Hang,
}

/// Canned [`ProfileSource`] that records the usernames it was asked for.
pub(super) struct StubProfiles {
    outcome: Outcome,
    pub(super) requested: std::sync::Mutex<Vec<String>>,
}

impl StubProfiles {
    pub(super) fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            requested: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(super) fn nike() -> Self {
        Self::new(Outcome::Snapshot(ProfileSnapshot::new(
            Some("https://scontent.cdninstagram.com/nike.jpg".to_string()),
            "Nike".to_string(),
            "Just Do It.".to_string(),
            "1,234".to_string(),
            "302M".to_string(),
            "150".to_string(),
            true,
        )))
    }

    pub(super) fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileSource for StubProfiles {
    async fn fetch(&self, username: &str) -> Result<ProfileSnapshot, FetchError> {
        self.requested.lock().unwrap().push(username.to_string());
        match &self.outcome {
            Outcome::Snapshot(snapshot) => Ok(snapshot.clone()),
            Outcome::Launch => Err(FetchError::Launch("chrome binary not found".to_string())),
            Outcome::Navigation => Err(FetchError::Navigation {
                url: format!("https://www.instagram.com/{username}/"),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
            Outcome::SelectorTimeout => Err(FetchError::SelectorTimeout {
                selector: "header img".to_string(),
                timeout_secs: 10,
            }),
            Outcome::Browser => Err(FetchError::Browser(
                "Target closed unexpectedly".to_string(),
            )),
            Outcome::Deadline => Err(FetchError::DeadlineExceeded { timeout_secs: 60 }),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Browser("unreachable".to_string()))
            }
        }
    }
}

/// Launcher whose sessions fail navigation and count their closes.
#[derive(Clone, Default)]
pub(super) struct FailingLauncher {
    pub(super) closes: Arc<AtomicUsize>,
}

pub(super) struct FailingSession {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserLauncher for FailingLauncher {
    type Session = FailingSession;

    async fn launch(&self) -> Result<FailingSession, FetchError> {
        Ok(FailingSession {
            closes: Arc::clone(&self.closes),
        })
    }
}

#[async_trait]
impl BrowserSession for FailingSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), FetchError> {
        Err(FetchError::Navigation {
            url: url.to_string(),
            message: "net::ERR_CONNECTION_RESET".to_string(),
        })
    }

    async fn wait_for_selector(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<(), FetchError> {
        Ok(())
    }

    async fn wait_for_navigation(&mut self, _timeout: Duration) -> Result<(), FetchError> {
        Ok(())
    }

    async fn click(&mut self, _selector: &str) -> Result<bool, FetchError> {
        Ok(false)
    }

    async fn text(&mut self, _selector: &str) -> Result<Option<String>, FetchError> {
        Ok(None)
    }

    async fn image_source(&mut self, _selector: &str) -> Result<Option<String>, FetchError> {
        Ok(None)
    }

    async fn exists(&mut self, _selector: &str) -> Result<bool, FetchError> {
        Ok(false)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Enabled auth backend with one known account.
///
/// Password `correct` signs in; token `token-ok` resolves to that account.
#[derive(Default)]
pub(super) struct StaticAuth {
    pub(super) sign_outs: AtomicUsize,
    pub(super) resets: AtomicUsize,
}

pub(super) fn known_user() -> AuthUser {
    AuthUser {
        id: "u-1".to_string(),
        email: Some("creator@example.com".to_string()),
        user_metadata: serde_json::Map::from_iter([(
            "role".to_string(),
            serde_json::Value::String("influencer".to_string()),
        )]),
    }
}

#[async_trait]
impl AuthBackend for StaticAuth {
    async fn sign_in(&self, _email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        if password != "correct" {
            return Err(AuthError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        Ok(Some(Session {
            access_token: "token-ok".to_string(),
            refresh_token: Some("refresh-ok".to_string()),
            expires_in: Some(3600),
            token_type: Some("bearer".to_string()),
            user: known_user(),
        }))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        role: UserRole,
    ) -> Result<SignUpOutcome, AuthError> {
        if !role.is_self_assignable() {
            return Err(AuthError::RoleNotSelfAssignable(role));
        }
        Ok(SignUpOutcome {
            user: Some(AuthUser {
                id: "u-new".to_string(),
                email: Some(email.to_string()),
                user_metadata: serde_json::Map::new(),
            }),
            session: None,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok((access_token == "token-ok").then(known_user))
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_profile(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Option<User>, AuthError> {
        Ok(Some(User {
            id: user_id.to_string(),
            email: "creator@example.com".to_string(),
            role: UserRole::Influencer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
    }
}
