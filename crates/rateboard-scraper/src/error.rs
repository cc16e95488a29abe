use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {timeout_secs}s waiting for selector \"{selector}\"")]
    SelectorTimeout { selector: String, timeout_secs: u64 },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("profile fetch exceeded its {timeout_secs}s deadline")]
    DeadlineExceeded { timeout_secs: u64 },
}
