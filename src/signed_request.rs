//! Facebook-style signed payloads
//!
//! A signed payload is a JSON object authenticated with the application
//! secret. The wire format is `base64url(signature) + "." + base64url(json)`,
//! where the signature is HMAC-SHA256 over the encoded JSON. Signing stamps
//! `algorithm` and `issued_at` into the payload.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;

use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

/// The only algorithm accepted in the `algorithm` field
pub const ALGORITHM: &str = "HMAC-SHA256";

/// A decoded signed payload
pub type SignedPayload = Map<String, Value>;

fn mac_for(payload: &str, secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac
}

// Accept padded input as well, some encoders keep the trailing '='.
fn decode(part: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(part.trim_end_matches('='))
}

/// Sign `data` with `secret`.
pub fn make(mut data: SignedPayload, secret: &str) -> Result<String, SessionError> {
    data.insert("algorithm".to_string(), Value::from(ALGORITHM));
    data.insert(
        "issued_at".to_string(),
        Value::from(chrono::Utc::now().timestamp()),
    );

    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&data)?);
    let signature = URL_SAFE_NO_PAD.encode(mac_for(&payload, secret).finalize().into_bytes());
    Ok(format!("{}.{}", signature, payload))
}

/// Verify and decode a signed payload.
///
/// The signature is checked before the JSON is parsed.
pub fn parse(signed: &str, secret: &str) -> Result<SignedPayload, SessionError> {
    let (encoded_signature, payload) = signed
        .split_once('.')
        .ok_or(SessionError::InvalidSignature)?;

    let signature = decode(encoded_signature).map_err(|_| SessionError::InvalidSignature)?;
    mac_for(payload, secret)
        .verify_slice(&signature)
        .map_err(|_| SessionError::InvalidSignature)?;

    let data: SignedPayload = serde_json::from_slice(&decode(payload)?)?;
    match data.get("algorithm").and_then(Value::as_str) {
        Some(alg) if alg.eq_ignore_ascii_case(ALGORITHM) => Ok(data),
        Some(alg) => Err(SessionError::UnsupportedAlgorithm(alg.to_string())),
        None => Err(SessionError::MissingField("algorithm")),
    }
}
