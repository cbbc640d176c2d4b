//! Bearer-token claims decoding.
//!
//! Tokens are JWTs issued by the backend. The client only needs the payload
//! claims (username, role, expiry) and decodes them locally with no server
//! round-trip. The signature is not verified here — the backend rejects
//! tampered tokens on first use.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use leveltest_core::model::Role;

use crate::error::AuthFlowError;

/// The claims carried in a session token's payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub username: String,
    pub role: Role,
    /// Expiry as a Unix timestamp. Tokens without one never expire
    /// client-side.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decode the claims from a three-segment bearer token.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthFlowError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthFlowError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthFlowError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthFlowError::MalformedToken)
}
