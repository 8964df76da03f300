//! Unverified JWT payload inspection
//!
//! The client never validates signatures; it only peeks at the payload to
//! show who is signed in and when the access token runs out.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Decode the payload segment of a JWT without checking the signature
pub fn parse_jwt(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// User id carried by the token (`userId`, falling back to `sub`)
pub fn user_id_from_token(token: &str) -> Option<String> {
    let claims = parse_jwt(token)?;
    claims
        .get("userId")
        .or_else(|| claims.get("sub"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Expiry (`exp`) of the token
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = parse_jwt(token)?.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
