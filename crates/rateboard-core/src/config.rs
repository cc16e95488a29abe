use crate::app_config::{AppConfig, BrowserSettings, Environment};
use crate::ConfigError;

/// Desktop Chrome UA sent to profile pages; the default headless UA is
/// routinely served a login wall instead of the profile.
pub const DEFAULT_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset, matching how deploy tooling blanks secrets.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("RATEBOARD_ENV", "development"))?;

    let bind_addr = or_default("RATEBOARD_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("RATEBOARD_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("RATEBOARD_LOG_LEVEL", "info");

    let profile_base_url = or_default("RATEBOARD_PROFILE_BASE_URL", "https://www.instagram.com")
        .trim_end_matches('/')
        .to_string();
    if !profile_base_url.starts_with("http://") && !profile_base_url.starts_with("https://") {
        return Err(invalid(
            "RATEBOARD_PROFILE_BASE_URL",
            "must be an http(s) URL".to_string(),
        ));
    }

    let browser = BrowserSettings {
        executable: optional("RATEBOARD_BROWSER_EXECUTABLE").map(PathBuf::from),
        headless: parse_bool("RATEBOARD_BROWSER_HEADLESS", "true")?,
        user_agent: or_default("RATEBOARD_BROWSER_USER_AGENT", DEFAULT_BROWSER_USER_AGENT),
        navigation_timeout_secs: parse_u64("RATEBOARD_NAVIGATION_TIMEOUT_SECS", "30")?,
        selector_timeout_secs: parse_u64("RATEBOARD_SELECTOR_TIMEOUT_SECS", "10")?,
    };
    let request_timeout_secs = parse_u64("RATEBOARD_REQUEST_TIMEOUT_SECS", "60")?;

    let supabase_url = optional("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string());
    let supabase_anon_key = optional("SUPABASE_ANON_KEY");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        profile_base_url,
        browser,
        request_timeout_secs,
        supabase_url,
        supabase_anon_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RATEBOARD_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
