//! Route protection: which paths need a session and where to send callers
//! who are in the wrong place.

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const AUTH_PREFIXES: &[&str] = &["/login", "/signup", "/reset-password"];
const API_PREFIXES: &[&str] = &["/api", "/estimator"];
const PUBLIC_PREFIXES: &[&str] = &["/_next", "/public"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Sign-in, sign-up and password reset pages.
    Auth,
    /// Machine endpoints; they answer for themselves.
    Api,
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    RedirectToLogin { from: String },
    RedirectToDashboard,
}

impl RouteDecision {
    /// Redirect target, or `None` for [`RouteDecision::Continue`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            RouteDecision::Continue => None,
            RouteDecision::RedirectToLogin { from } => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("from", from)
                    .finish();
                Some(format!("{LOGIN_PATH}?{query}"))
            }
            RouteDecision::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
        }
    }
}

/// Matches `prefix` on whole path segments, so `/api` covers `/api/v1` but
/// not `/apiary`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if AUTH_PREFIXES.iter().any(|p| under(path, p)) {
        RouteClass::Auth
    } else if API_PREFIXES.iter().any(|p| under(path, p)) {
        RouteClass::Api
    } else if path == "/" || PUBLIC_PREFIXES.iter().any(|p| under(path, p)) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

/// Decides whether a request for `path` proceeds or is redirected.
#[must_use]
pub fn route_decision(path: &str, authenticated: bool) -> RouteDecision {
    match (classify(path), authenticated) {
        (RouteClass::Protected, false) => RouteDecision::RedirectToLogin {
            from: path.to_string(),
        },
        (RouteClass::Auth, true) => RouteDecision::RedirectToDashboard,
        _ => RouteDecision::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_prefixes() {
        assert_eq!(classify("/login"), RouteClass::Auth);
        assert_eq!(classify("/signup/company"), RouteClass::Auth);
        assert_eq!(classify("/api/v1/health"), RouteClass::Api);
        assert_eq!(classify("/estimator"), RouteClass::Api);
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/_next/static/app.js"), RouteClass::Public);
        assert_eq!(classify("/dashboard"), RouteClass::Protected);
        assert_eq!(classify("/calculator"), RouteClass::Protected);
    }

    #[test]
    fn prefixes_match_whole_segments() {
        assert_eq!(classify("/apiary"), RouteClass::Protected);
        assert_eq!(classify("/login-help"), RouteClass::Protected);
    }

    #[test]
    fn anonymous_caller_is_sent_to_login_with_origin() {
        let decision = route_decision("/campaigns", false);
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                from: "/campaigns".to_string()
            }
        );
        assert_eq!(
            decision.location().as_deref(),
            Some("/login?from=%2Fcampaigns")
        );
    }

    #[test]
    fn signed_in_caller_skips_auth_pages() {
        let decision = route_decision("/login", true);
        assert_eq!(decision, RouteDecision::RedirectToDashboard);
        assert_eq!(decision.location().as_deref(), Some("/dashboard"));
    }

    #[test]
    fn api_and_public_routes_always_continue() {
        for authenticated in [false, true] {
            assert_eq!(
                route_decision("/api/auth/session", authenticated),
                RouteDecision::Continue
            );
            assert_eq!(route_decision("/", authenticated), RouteDecision::Continue);
        }
    }

    #[test]
    fn signed_in_caller_reaches_protected_pages() {
        assert_eq!(route_decision("/portfolio", true), RouteDecision::Continue);
        assert_eq!(RouteDecision::Continue.location(), None);
    }
}
