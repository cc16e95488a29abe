use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Browser settings consumed by the profile fetcher.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary; `None` lets the driver auto-detect.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub user_agent: String,
    pub navigation_timeout_secs: u64,
    pub selector_timeout_secs: u64,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub profile_base_url: String,
    pub browser: BrowserSettings,
    pub request_timeout_secs: u64,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl AppConfig {
    /// Supabase credentials, present only when both halves are configured.
    #[must_use]
    pub fn supabase_credentials(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("profile_base_url", &self.profile_base_url)
            .field("browser", &self.browser)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_anon_key",
                &self.supabase_anon_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
