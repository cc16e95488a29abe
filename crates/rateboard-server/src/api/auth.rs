use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use rateboard_auth::{AuthContext, AuthError};
use rateboard_core::{User, UserRole};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::{session_token, RequestId};

#[derive(Debug, Deserialize)]
pub(super) struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SignUpRequest {
    email: String,
    password: String,
    role: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResetPasswordRequest {
    email: String,
}

/// What the caller's session resolves to.
#[derive(Debug, Serialize)]
pub(super) struct SessionView {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
    user_id: Option<String>,
    email: Option<String>,
    role: Option<UserRole>,
    profile: Option<User>,
}

impl SessionView {
    fn from_context(ctx: &AuthContext) -> Self {
        let session = ctx.session();
        Self {
            authenticated: ctx.is_authenticated(),
            access_token: session.map(|s| s.access_token.clone()),
            refresh_token: session.and_then(|s| s.refresh_token.clone()),
            expires_in: session.and_then(|s| s.expires_in),
            user_id: ctx.auth_user().map(|u| u.id.clone()),
            email: ctx.auth_user().and_then(|u| u.email.clone()),
            role: ctx
                .user()
                .map(|u| u.role)
                .or_else(|| ctx.auth_user().and_then(|u| u.role())),
            profile: ctx.user().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpView {
    user_id: Option<String>,
    /// `true` when the account must confirm its email before signing in.
    confirmation_required: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct Acknowledged {
    ok: bool,
}

fn validate_credentials(req_id: &str, email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "a valid email address is required",
        ));
    }
    if password.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "password is required",
        ));
    }
    Ok(())
}

fn ensure_enabled(state: &AppState, req_id: &str) -> Result<(), ApiError> {
    if state.auth.enabled() {
        Ok(())
    } else {
        Err(ApiError::new(
            req_id,
            "auth_disabled",
            "authentication is not configured",
        ))
    }
}

/// Unreadable bodies answer inside the envelope rather than with axum's
/// plain-text rejection.
fn read_body<T>(req_id: &str, body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.body_text()))
}

/// Backend refusals become 4xx carrying the backend's message; anything else
/// is logged and reported as an internal error.
fn map_auth_error(request_id: String, client_code: &str, error: &AuthError) -> ApiError {
    if error.is_client_error() {
        return ApiError::new(request_id, client_code, error.to_string());
    }
    tracing::error!(error = %error, "auth backend call failed");
    ApiError::new(request_id, "internal_error", "auth backend unavailable")
}

pub(super) async fn sign_in(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_enabled(&state, &req_id.0)?;
    let body = read_body(&req_id.0, body)?;
    validate_credentials(&req_id.0, &body.email, &body.password)?;

    let mut ctx = AuthContext::anonymous(state.auth.clone());
    ctx.sign_in(body.email.trim(), &body.password)
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "unauthorized", &e))?;

    if !ctx.is_authenticated() {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "invalid email or password",
        ));
    }

    Ok(Json(ApiResponse::new(
        req_id.0,
        SessionView::from_context(&ctx),
    )))
}

pub(super) async fn sign_up(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_enabled(&state, &req_id.0)?;
    let body = read_body(&req_id.0, body)?;
    validate_credentials(&req_id.0, &body.email, &body.password)?;

    let role: UserRole = body
        .role
        .parse()
        .map_err(|_| ApiError::new(req_id.0.clone(), "validation_error", "unknown role"))?;
    if !role.is_self_assignable() {
        return Err(ApiError::new(
            req_id.0,
            "forbidden",
            format!("role \"{role}\" cannot be chosen at sign-up"),
        ));
    }

    let outcome = state
        .auth
        .sign_up(body.email.trim(), &body.password, role)
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "bad_request", &e))?;

    tracing::info!(role = %role, "account registered");
    Ok(Json(ApiResponse::new(
        req_id.0,
        SignUpView {
            user_id: outcome.user.map(|u| u.id),
            confirmation_required: outcome.session.is_none(),
        },
    )))
}

pub(super) async fn sign_out(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers);
    let mut ctx = AuthContext::restore(state.auth.clone(), token.as_deref())
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "bad_request", &e))?;
    ctx.sign_out()
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "bad_request", &e))?;
    Ok(Json(ApiResponse::new(req_id.0, Acknowledged { ok: true })))
}

pub(super) async fn reset_password(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_enabled(&state, &req_id.0)?;
    let body = read_body(&req_id.0, body)?;
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "a valid email address is required",
        ));
    }

    state
        .auth
        .reset_password(email)
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "bad_request", &e))?;
    Ok(Json(ApiResponse::new(req_id.0, Acknowledged { ok: true })))
}

pub(super) async fn session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers);
    let ctx = AuthContext::restore(state.auth.clone(), token.as_deref())
        .await
        .map_err(|e| map_auth_error(req_id.0.clone(), "unauthorized", &e))?;
    Ok(Json(ApiResponse::new(
        req_id.0,
        SessionView::from_context(&ctx),
    )))
}
