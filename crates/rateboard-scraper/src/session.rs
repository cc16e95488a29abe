//! Browser automation seam.
//!
//! [`ProfileFetcher`](crate::ProfileFetcher) only talks to these traits, so
//! the Chrome driver can be swapped for a scripted double in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// Starts one isolated browser session per call.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// # Errors
    ///
    /// Returns [`FetchError::Launch`] if the browser cannot be started.
    async fn launch(&self) -> Result<Self::Session, FetchError>;
}

/// A live browser session holding a single page.
///
/// Query methods return `Ok(None)` / `Ok(false)` when the selector matches
/// nothing; `Err` is reserved for the browser itself misbehaving.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url`, failing with [`FetchError::Navigation`] on error or when
    /// `timeout` elapses first.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError>;

    /// Waits until `selector` matches, failing with
    /// [`FetchError::SelectorTimeout`] after `timeout`.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError>;

    /// Waits for an in-flight navigation (e.g. after a click) to settle.
    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), FetchError>;

    /// Clicks the first match. Returns `false` when nothing matched.
    async fn click(&mut self, selector: &str) -> Result<bool, FetchError>;

    /// Rendered text of the first match.
    async fn text(&mut self, selector: &str) -> Result<Option<String>, FetchError>;

    /// Resolved `src` of the first matching image.
    async fn image_source(&mut self, selector: &str) -> Result<Option<String>, FetchError>;

    async fn exists(&mut self, selector: &str) -> Result<bool, FetchError>;

    /// Shuts the session down. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), FetchError>;
}
