//! Unsigned token builders for unit tests.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn token_with_claims(claims: &Value) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn temp_token(page_route: &str, exp: i64) -> String {
    token_with_claims(&json!({ "page_route": page_route, "exp": exp, "sub": "a@b.com" }))
}

pub fn session_token(role: &str, exp: i64) -> String {
    token_with_claims(&json!({ "role": role, "exp": exp, "sub": "someone@example.com" }))
}

pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
