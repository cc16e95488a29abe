use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use rateboard_auth::{policy::classify, route_decision, RouteClass};
use uuid::Uuid;

use crate::api::AppState;

/// Cookie carrying the Supabase access token for browser callers.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Redirects page requests according to session presence.
///
/// Anonymous callers on protected pages go to `/login?from=…`; signed-in
/// callers on auth pages go to `/dashboard`. API and public paths pass
/// untouched, as does everything when the auth backend is disabled.
pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.auth.enabled() {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    if matches!(classify(&path), RouteClass::Api | RouteClass::Public) {
        return next.run(req).await;
    }

    let authenticated = match session_token(req.headers()) {
        Some(token) => match state.auth.current_user(&token).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed; treating caller as anonymous");
                false
            }
        },
        None => false,
    };

    match route_decision(&path, authenticated).location() {
        Some(location) => Redirect::temporary(&location).into_response(),
        None => next.run(req).await,
    }
}

/// Access token from `Authorization: Bearer …`, falling back to the
/// [`SESSION_COOKIE`] cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers.get(AUTHORIZATION))
        .or_else(|| {
            headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(';'))
                .find_map(|pair| {
                    let (name, value) = pair.trim().split_once('=')?;
                    (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
                })
        })
        .map(ToOwned::to_owned)
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
