//! Supabase client over the GoTrue (`/auth/v1`) and PostgREST (`/rest/v1`)
//! HTTP APIs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rateboard_core::{User, UserRole};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use crate::backend::{ensure_self_assignable, AuthBackend, AuthUser, Session, SignUpOutcome};
use crate::error::AuthError;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Profile table written at sign-up and read on session restore.
const USERS_TABLE: &str = "users";

pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidUrl`] when `base_url` is not an http(s)
    /// URL, or [`AuthError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AuthError> {
        let parsed = url::Url::parse(base_url).map_err(|e| AuthError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuthError::InvalidUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Attaches the project key plus the caller's bearer token, falling back
    /// to the anon key for unauthenticated calls.
    fn authorized(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(self.anon_key.as_str()))
    }

    async fn insert_profile(
        &self,
        user: &AuthUser,
        email: &str,
        role: UserRole,
        access_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let row = User {
            id: user.id.clone(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };

        let request = self
            .client
            .post(self.rest_url(USERS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&[row]);
        ensure_success(self.authorized(request, access_token).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = ensure_success(self.authorized(request, None).send().await?).await?;
        let session: Session = response.json().await?;
        tracing::debug!(user_id = %session.user.id, "signed in");
        Ok(Some(session))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SignUpOutcome, AuthError> {
        ensure_self_assignable(role)?;

        let request = self.client.post(self.auth_url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "role": role.as_str() },
        }));
        let response = ensure_success(self.authorized(request, None).send().await?).await?;
        let outcome = parse_sign_up(response.json().await?);

        if let Some(ref user) = outcome.user {
            let token = outcome.session.as_ref().map(|s| s.access_token.as_str());
            self.insert_profile(user, email, role, token).await?;
            tracing::info!(user_id = %user.id, role = %role, "account created");
        }
        Ok(outcome)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self.client.post(self.auth_url("logout"));
        let response = self.authorized(request, Some(access_token)).send().await?;
        // An already-revoked token is as signed out as it gets.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Ok(());
        }
        ensure_success(response).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let request = self.client.get(self.auth_url("user"));
        let response = self.authorized(request, Some(access_token)).send().await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let user = ensure_success(response).await?.json().await?;
        Ok(Some(user))
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let request = self
            .client
            .post(self.auth_url("recover"))
            .json(&json!({ "email": email }));
        ensure_success(self.authorized(request, None).send().await?).await?;
        Ok(())
    }

    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let request = self
            .client
            .get(self.rest_url(USERS_TABLE))
            .query(&[("id", format!("eq.{user_id}").as_str()), ("select", "*")]);
        let response = ensure_success(self.authorized(request, Some(access_token)).send().await?)
            .await?;
        let rows: Vec<User> = response.json().await?;
        Ok(rows.into_iter().next())
    }
}

/// GoTrue answers sign-up with a full session when confirmation is off and
/// with the bare user object when it is on.
fn parse_sign_up(body: Value) -> SignUpOutcome {
    if body.get("access_token").is_some() {
        if let Ok(session) = serde_json::from_value::<Session>(body.clone()) {
            return SignUpOutcome {
                user: Some(session.user.clone()),
                session: Some(session),
            };
        }
    }

    let user_value = body.get("user").cloned().unwrap_or(body);
    SignUpOutcome {
        user: serde_json::from_value(user_value).ok(),
        session: None,
    }
}

async fn ensure_success(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pulls the human-readable message out of a GoTrue/PostgREST error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
