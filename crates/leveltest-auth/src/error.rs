//! Auth lifecycle error types.

use thiserror::Error;

use leveltest_core::error::ApiError;

/// Errors from the identity lifecycle operations.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The token is not a decodable bearer token.
    #[error("malformed identity token")]
    MalformedToken,

    /// The backend rejected the supplied credentials.
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    /// Reading or writing the persisted token failed.
    #[error("token storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The auth backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
