pub mod app_config;
pub mod config;
pub mod counts;
pub mod pricing;
pub mod profile;
pub mod users;

pub use app_config::{AppConfig, BrowserSettings, Environment};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_BROWSER_USER_AGENT};
pub use counts::{parse_count, try_parse_count};
pub use pricing::{estimate_prices, PriceEstimate, Tier, TIER_THRESHOLD};
pub use profile::{normalize_username, ProfileEstimate, ProfileSnapshot};
pub use users::{User, UserRole};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid user role: {0}")]
    InvalidRole(String),
}
