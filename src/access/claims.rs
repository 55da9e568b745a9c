//! Read-only decoding of compact JWT claims.
//!
//! The client never verifies signatures; it only needs `page_route`, `exp` and
//! `role` to decide what to show. The backend remains the authority for every
//! grant it minted.

use crate::access::error::ClaimsError;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Role claim value that bypasses the code mechanism.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Claims carried by a temporary access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporaryAccessClaims {
    pub page_route: String,
    /// Unix seconds. Integer and fractional JSON numbers are both accepted.
    pub exp: f64,
}

impl TemporaryAccessClaims {
    /// Exact route match and `exp * 1000 > now_ms`.
    #[must_use]
    pub fn is_valid_for(&self, page_route: &str, now_ms: i64) -> bool {
        self.page_route == page_route && !self.is_expired(now_ms)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.exp * 1000.0 <= now_ms as f64
    }
}

/// Claims carried by the long-lived login token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub role: String,
    #[serde(default)]
    pub exp: Option<f64>,
}

impl SessionClaims {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

fn b64d_json<T: DeserializeOwned>(s: &str) -> Result<T, ClaimsError> {
    let bytes =
        Base64UrlUnpadded::decode_vec(s.trim_end_matches('=')).map_err(|_| ClaimsError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode the payload segment of a compact JWT into `T`.
///
/// # Errors
///
/// Returns an error if the token does not have exactly three segments, or the
/// payload is not base64url-encoded JSON matching `T`.
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> Result<T, ClaimsError> {
    let mut parts = token.trim().split('.');
    let _header = parts.next().ok_or(ClaimsError::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(ClaimsError::TokenFormat)?;
    let _signature = parts.next().ok_or(ClaimsError::TokenFormat)?;
    if parts.next().is_some() || claims_b64.is_empty() {
        return Err(ClaimsError::TokenFormat);
    }

    b64d_json(claims_b64)
}
