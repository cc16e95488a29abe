//! [`BrowserLauncher`] backed by a local Chrome/Chromium via `chromiumoxide`.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use rateboard_core::BrowserSettings;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::session::{BrowserLauncher, BrowserSession};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long the resource count must hold still before the network counts
/// as quiet.
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";

pub struct ChromeLauncher {
    settings: BrowserSettings,
}

impl ChromeLauncher {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder();
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(ref executable) = self.settings.executable {
            builder = builder.chrome_executable(executable);
        }

        builder
            .arg(format!("--user-agent={}", self.settings.user_agent))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| FetchError::Launch(format!("invalid browser config: {e}")))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, FetchError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::debug!("browser session launched");

        Ok(ChromeSession {
            browser,
            page: None,
            handler_task,
            closed: false,
        })
    }
}

/// One Chrome process with at most one open tab.
pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page, FetchError> {
        self.page
            .as_ref()
            .ok_or_else(|| FetchError::Browser("no page has been opened".to_string()))
    }

    /// Returns once no new resource entries have appeared for
    /// [`NETWORK_QUIET_WINDOW`]. Callers bound it with their own deadline.
    async fn wait_for_network_quiet(&self) {
        let Ok(page) = self.page() else {
            return;
        };
        let mut last_count: Option<u64> = None;
        let mut quiet_since = tokio::time::Instant::now();

        loop {
            let count = match page.evaluate(RESOURCE_COUNT_SCRIPT).await {
                Ok(result) => result.into_value::<u64>().ok(),
                Err(e) => {
                    tracing::debug!(error = %e, "resource count unavailable");
                    return;
                }
            };
            let now = tokio::time::Instant::now();
            if count != last_count {
                last_count = count;
                quiet_since = now;
            } else if now.duration_since(quiet_since) >= NETWORK_QUIET_WINDOW {
                return;
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    /// Runs `accessor` against the first element matching `selector`.
    ///
    /// The script yields `null` when nothing matches, which surfaces as
    /// `Ok(None)`.
    async fn query<T: DeserializeOwned>(
        &self,
        selector: &str,
        accessor: &str,
    ) -> Result<Option<T>, FetchError> {
        let page = self.page()?;
        let quoted = serde_json::to_string(selector)
            .map_err(|e| FetchError::Browser(format!("unencodable selector: {e}")))?;
        let script = format!(
            "(() => {{ const el = document.querySelector({quoted}); return el ? {accessor} : null; }})()"
        );
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| FetchError::Browser(format!("evaluate '{selector}': {e}")))?;
        // A null result carries no value at all, so deserialization failure
        // means "no match" rather than a broken page.
        Ok(result.into_value::<Option<T>>().ok().flatten())
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        let navigation_error = |message: String| FetchError::Navigation {
            url: url.to_string(),
            message,
        };

        if self.page.is_none() {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| navigation_error(format!("failed to open page: {e}")))?;
            self.page = Some(page);
        }
        let page = self.page()?;

        let deadline = tokio::time::Instant::now() + timeout;
        match tokio::time::timeout_at(deadline, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(navigation_error(e.to_string())),
            Err(_) => {
                return Err(navigation_error(format!(
                    "navigation timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }

        if tokio::time::timeout_at(deadline, self.wait_for_network_quiet())
            .await
            .is_err()
        {
            tracing::debug!(url, "network still busy at navigation deadline");
        }
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        let page = self.page()?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(FetchError::SelectorTimeout {
                    selector: selector.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), FetchError> {
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(FetchError::Browser(e.to_string())),
            Err(_) => Err(FetchError::Browser(format!(
                "navigation did not settle within {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<bool, FetchError> {
        let page = self.page()?;
        let Ok(element) = page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .map_err(|e| FetchError::Browser(format!("click '{selector}': {e}")))?;
        Ok(true)
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        self.query(selector, "el.innerText").await
    }

    async fn image_source(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        self.query(selector, "(el.src || null)").await
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, FetchError> {
        Ok(self.query::<bool>(selector, "true").await?.unwrap_or(false))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| FetchError::Browser(format!("close: {e}")));
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "waiting for browser process exit failed");
        }
        self.handler_task.abort();
        tracing::debug!("browser session closed");
        result
    }
}
