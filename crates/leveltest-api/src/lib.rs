//! leveltest-api — HTTP collaborators for the leveltest session engine.
//!
//! Implements the core crate's `QuestionSource` and `SubmissionClient`
//! seams and the auth crate's `AuthBackend` seam against the platform
//! backend.

pub mod auth;
pub mod config;
pub mod questions;
pub mod submission;

use serde::Deserialize;

use leveltest_core::error::ApiError;

/// Classify a transport-level reqwest failure.
pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(timeout_secs)
    } else {
        ApiError::Network(e.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Extract the backend's `{"error": "..."}` message, falling back to the
/// raw body.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body)
}
