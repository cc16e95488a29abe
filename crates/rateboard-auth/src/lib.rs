//! Account capability backed by Supabase, with a no-op stand-in for
//! deployments that run without credentials.

pub mod backend;
pub mod context;
pub mod error;
pub mod noop;
pub mod policy;
pub mod supabase;

use std::sync::Arc;

use rateboard_core::AppConfig;

pub use backend::{AuthBackend, AuthUser, Session, SignUpOutcome};
pub use context::AuthContext;
pub use error::AuthError;
pub use noop::NoopAuth;
pub use policy::{route_decision, RouteClass, RouteDecision};
pub use supabase::SupabaseAuth;

/// Picks the auth backend for this process.
///
/// Uses [`SupabaseAuth`] when both the project URL and anon key are
/// configured, otherwise [`NoopAuth`].
///
/// # Errors
///
/// Returns [`AuthError`] if Supabase is configured but the client cannot be
/// built from its settings.
pub fn select_backend(config: &AppConfig) -> Result<Arc<dyn AuthBackend>, AuthError> {
    if let Some((url, anon_key)) = config.supabase_credentials() {
        tracing::info!(supabase_url = url, "using Supabase auth backend");
        return Ok(Arc::new(SupabaseAuth::new(url, anon_key)?));
    }

    tracing::warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set; auth disabled, using no-op backend");
    Ok(Arc::new(NoopAuth))
}
