//! Request and response payloads for the access endpoints. Codes and tokens
//! travel in these structs, so they must never be logged whole.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRequest {
    pub email: String,
    pub page_route: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
    pub page_route: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifyCodeResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// One pending request as shown to an operator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessCode {
    pub id: serde_json::Value,
    pub email: String,
    pub page_route: String,
    pub code: String,
}

impl AccessCode {
    /// Identifier as text, whether the backend sent a number or a string.
    #[must_use]
    pub fn id_text(&self) -> String {
        match &self.id {
            serde_json::Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The `detail` text, if the backend sent a non-empty string.
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                Some(detail.clone())
            }
            _ => None,
        }
    }
}
