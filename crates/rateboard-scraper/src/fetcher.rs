use std::time::Duration;

use async_trait::async_trait;
use rateboard_core::{AppConfig, ProfileSnapshot};
use url::Url;

use crate::error::FetchError;
use crate::extract::ExtractedFields;
use crate::selectors;
use crate::session::{BrowserLauncher, BrowserSession};

/// Anything that can produce a [`ProfileSnapshot`] for a username.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetches the public profile of `username` as given; no normalization
    /// is applied.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the profile page cannot be loaded.
    async fn fetch(&self, username: &str) -> Result<ProfileSnapshot, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Origin profiles live under, e.g. `https://www.instagram.com`.
    pub profile_base_url: String,
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    /// Upper bound on one whole fetch, launch through extraction.
    pub deadline: Duration,
}

impl FetcherSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            profile_base_url: config.profile_base_url.clone(),
            navigation_timeout: Duration::from_secs(config.browser.navigation_timeout_secs),
            selector_timeout: Duration::from_secs(config.browser.selector_timeout_secs),
            deadline: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Fetches profiles with a fresh browser session per call.
///
/// The session is closed before `fetch` returns on every path, including
/// errors and deadline expiry. Nothing is retried.
pub struct ProfileFetcher<L> {
    launcher: L,
    settings: FetcherSettings,
}

impl<L: BrowserLauncher> ProfileFetcher<L> {
    pub fn new(launcher: L, settings: FetcherSettings) -> Self {
        Self { launcher, settings }
    }

    /// Builds `{base}/{username}/`, percent-encoding the username as a single
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Navigation`] if the configured base URL is not
    /// a usable origin.
    pub fn profile_url(&self, username: &str) -> Result<String, FetchError> {
        let base = &self.settings.profile_base_url;
        let invalid = |message: String| FetchError::Navigation {
            url: base.clone(),
            message,
        };

        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(username)
            .push("");
        Ok(url.into())
    }

    async fn scrape(
        &self,
        session: &mut L::Session,
        url: &str,
        username: &str,
    ) -> Result<ProfileSnapshot, FetchError> {
        session
            .navigate(url, self.settings.navigation_timeout)
            .await?;

        self.dismiss_cookie_prompt(session).await;

        session
            .wait_for_selector(selectors::PROFILE_READY, self.settings.selector_timeout)
            .await?;

        let fields = ExtractedFields::read(session).await;
        Ok(fields.into_snapshot(username))
    }

    async fn dismiss_cookie_prompt(&self, session: &mut L::Session) {
        match session.click(selectors::COOKIE_CONSENT_BUTTON).await {
            Ok(true) => {
                if let Err(e) = session
                    .wait_for_navigation(self.settings.navigation_timeout)
                    .await
                {
                    tracing::debug!(error = %e, "no navigation after cookie consent");
                }
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "cookie consent click failed"),
        }
    }
}

#[async_trait]
impl<L: BrowserLauncher> ProfileSource for ProfileFetcher<L> {
    async fn fetch(&self, username: &str) -> Result<ProfileSnapshot, FetchError> {
        let url = self.profile_url(username)?;
        let deadline = self.settings.deadline;
        let deadline_exceeded = || FetchError::DeadlineExceeded {
            timeout_secs: deadline.as_secs(),
        };
        let started = tokio::time::Instant::now();

        let mut session = match tokio::time::timeout(deadline, self.launcher.launch()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                tracing::error!(username, error = %e, "browser launch failed");
                return Err(e);
            }
            Err(_) => return Err(deadline_exceeded()),
        };

        let remaining = deadline.saturating_sub(started.elapsed());
        let result = tokio::time::timeout(remaining, self.scrape(&mut session, &url, username))
            .await
            .unwrap_or_else(|_| Err(deadline_exceeded()));

        if let Err(e) = session.close().await {
            tracing::warn!(username, error = %e, "failed to close browser session");
        }

        match &result {
            Ok(snapshot) => tracing::info!(
                username,
                followers = %snapshot.followers,
                verified = snapshot.verified,
                "profile fetched"
            ),
            Err(e) => tracing::warn!(username, url = %url, error = %e, "profile fetch failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
