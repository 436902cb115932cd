//! Visitor session cookie signature
//!
//! Uses the Node.js `cookie-signature` format so the visitor cookie can be
//! shared with express-session deployments:
//! `s:` + value + `.` + base64(hmac_sha256(value, secret)) without padding.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "s:";

fn mac_for(value: &str, secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    mac
}

/// Sign `value`, returning `s:<value>.<signature>`
pub fn sign(value: &str, secret: &str) -> String {
    let signature = STANDARD_NO_PAD.encode(mac_for(value, secret).finalize().into_bytes());
    format!("{}{}.{}", PREFIX, value, signature)
}

/// Verify a signed value and return the original.
///
/// The value ends at the last `.`, so values may contain dots themselves.
pub fn unsign(signed_value: &str, secret: &str) -> Option<String> {
    let (value, signature) = signed_value.strip_prefix(PREFIX)?.rsplit_once('.')?;
    let signature = STANDARD_NO_PAD.decode(signature).ok()?;

    mac_for(value, secret).verify_slice(&signature).ok()?;
    Some(value.to_string())
}

/// Try each secret in turn, for secret rotation
pub fn unsign_with_secrets(signed_value: &str, secrets: &[String]) -> Option<String> {
    secrets
        .iter()
        .find_map(|secret| unsign(signed_value, secret))
}
