//! Error types for the session engine and its collaborators.
//!
//! `ApiError` is defined here in `leveltest-core` so the session state
//! machine can classify collaborator failures for state decisions without
//! string matching.

use thiserror::Error;

use crate::session::SessionStatus;

/// Errors from the HTTP collaborators (question source, submission client,
/// auth backend).
#[derive(Debug, Error)]
pub enum ApiError {
    /// A transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the client's configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The bearer token was missing, expired, or rejected.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The backend returned a non-success response.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The backend returned zero questions. A session must never start
    /// with an empty question list.
    #[error("backend returned no questions")]
    EmptyResult,

    /// The response could not be decoded into the expected shape, or a
    /// question violated the one-correct-option invariant.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Returns `true` for transient failures a caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout(_) | ApiError::Server { .. }
        )
    }

    /// Returns `true` if the failure invalidates the stored identity and
    /// should trigger a logout rather than a retry.
    pub fn requires_logout(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

/// Errors from driving a [`crate::session::TestSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not valid in the session's current status. A
    /// sequencing defect in the caller — rejected, never tolerated.
    #[error("operation not allowed while the session is {actual}")]
    InvalidState { actual: SessionStatus },

    /// The selected text matches none of the current question's options.
    #[error("selected text matches none of the current options: {0:?}")]
    InvalidAnswer(String),

    /// A collaborator call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
