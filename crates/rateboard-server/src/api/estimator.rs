use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rateboard_core::{normalize_username, ProfileEstimate};
use rateboard_scraper::FetchError;
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct EstimatorParams {
    username: Option<String>,
}

/// Flat `{error, message?}` body the estimator answers failures with.
#[derive(Debug, Serialize)]
struct EstimatorErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug)]
enum EstimatorError {
    MissingUsername,
    Fetch(FetchError),
    TimedOut { timeout_secs: u64 },
}

impl EstimatorError {
    fn category(&self) -> &'static str {
        match self {
            EstimatorError::MissingUsername => "Username is required",
            EstimatorError::Fetch(FetchError::Launch(_)) => "Server error",
            EstimatorError::Fetch(FetchError::DeadlineExceeded { .. })
            | EstimatorError::TimedOut { .. } => "Request timed out",
            EstimatorError::Fetch(
                FetchError::Navigation { .. }
                | FetchError::SelectorTimeout { .. }
                | FetchError::Browser(_),
            ) => "Failed to fetch Instagram profile",
        }
    }
}

impl IntoResponse for EstimatorError {
    fn into_response(self) -> Response {
        let error = self.category();
        let (status, message) = match self {
            EstimatorError::MissingUsername => (StatusCode::BAD_REQUEST, None),
            EstimatorError::Fetch(e) => (StatusCode::INTERNAL_SERVER_ERROR, Some(e.to_string())),
            EstimatorError::TimedOut { timeout_secs } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(format!("no response within {timeout_secs}s")),
            ),
        };
        (status, Json(EstimatorErrorBody { error, message })).into_response()
    }
}

/// Reads the first `username` pair; repeated or unrelated parameters are
/// ignored.
pub(super) async fn estimate_get(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let username = query.as_deref().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == "username")
            .map(|(_, value)| value.into_owned())
    });
    run_estimate(&state, username.as_deref()).await
}

/// The body is parsed as JSON whatever its `Content-Type`. A body that is
/// not JSON, or lacks a string `username`, counts as a missing username.
pub(super) async fn estimate_post(State(state): State<AppState>, body: Bytes) -> Response {
    let params: EstimatorParams = serde_json::from_slice(&body).unwrap_or_default();
    run_estimate(&state, params.username.as_deref()).await
}

async fn run_estimate(state: &AppState, raw_username: Option<&str>) -> Response {
    let Some(username) = raw_username.and_then(normalize_username) else {
        return EstimatorError::MissingUsername.into_response();
    };

    let fetched = tokio::time::timeout(state.request_timeout, state.profiles.fetch(&username)).await;
    match fetched {
        Ok(Ok(snapshot)) => Json(ProfileEstimate::from(snapshot)).into_response(),
        Ok(Err(e)) => {
            tracing::error!(username, error = %e, "estimate failed");
            EstimatorError::Fetch(e).into_response()
        }
        Err(_) => {
            let timeout_secs = state.request_timeout.as_secs();
            tracing::error!(username, timeout_secs, "estimate timed out");
            EstimatorError::TimedOut { timeout_secs }.into_response()
        }
    }
}
