//! Stateless session tokens proving a caller once supplied the editing
//! password.
//!
//! A token is `base64url(payload) + "." + base64url(signature)` where the
//! payload is `{"expiresAt": <epoch millis>}` and the signature is
//! HMAC-SHA256 over the encoded payload, keyed by the server secret.
//! Validity is recomputed from the token alone; there is no session table.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "editable_session";
/// Session lifetime (24 hours, fixed).
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

const DELIMITER: char = '.';

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session secret must not be empty")]
    EmptySecret,
    #[error("Session secret rejected by HMAC")]
    InvalidKey,
}

/// Issue a token valid for [`SESSION_TTL`] from now.
pub fn issue(secret: &str) -> Result<String, SessionError> {
    issue_at(secret, now_millis())
}

/// Issue a token as if the current time were `now_ms`.
pub fn issue_at(secret: &str, now_ms: i64) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::EmptySecret);
    }
    let expires_at = now_ms.saturating_add(SESSION_TTL.as_millis() as i64);
    let payload = json!({ "expiresAt": expires_at }).to_string();
    let encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    let signature = sign(&encoded, secret)?;
    Ok(format!(
        "{encoded}{DELIMITER}{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Check `token` against `secret` at the current time. Never panics; every
/// malformed input is simply invalid.
pub fn verify(token: &str, secret: &str) -> bool {
    verify_at(token, secret, now_millis())
}

pub fn verify_at(token: &str, secret: &str, now_ms: i64) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some((encoded, provided)) = token.split_once(DELIMITER) else {
        return false;
    };
    if encoded.is_empty() || provided.is_empty() {
        return false;
    }

    let Ok(expected) = sign(encoded, secret) else {
        return false;
    };
    let Ok(provided) = URL_SAFE_NO_PAD.decode(provided) else {
        return false;
    };
    if provided.len() != expected.len() {
        return false;
    }
    if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
        return false;
    }

    match decode_expiry(encoded) {
        Some(expires_at) => now_ms as f64 <= expires_at,
        None => false,
    }
}

fn sign(encoded_payload: &str, secret: &str) -> Result<Vec<u8>, SessionError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SessionError::InvalidKey)?;
    mac.update(encoded_payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Extract `expiresAt` from an encoded payload; `None` unless it is a number.
fn decode_expiry(encoded: &str) -> Option<f64> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let payload: Value = serde_json::from_slice(&bytes).ok()?;
    payload.get("expiresAt")?.as_f64()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
