use thiserror::Error;

/// Message shown when a failure carries no backend detail.
pub const GENERIC_FAILURE: &str = "Request failed.";

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("token store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum AccessError {
    /// Client-local input problem; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("request failed ({status}): {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE))]
    Backend { status: u16, detail: Option<String> },
    #[error("unable to reach the server: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("failed to decode response: {0}")]
    Parse(String),
    /// The exchange succeeded at the HTTP level but carried no token.
    #[error("grant response did not include an access token")]
    MalformedGrant,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("navigation to {route} failed: {reason}")]
    Navigation { route: String, reason: String },
    #[error("invalid flow transition from {from} on {event}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

impl AccessError {
    /// Text suitable for an inline, dismissable error message.
    ///
    /// Backend details pass through verbatim; everything else that is not a
    /// validation problem collapses into [`GENERIC_FAILURE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Backend {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for AccessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
