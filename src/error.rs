//! Session error types

use std::fmt;

/// Errors that can occur during session operations
#[derive(Debug)]
pub enum SessionError {
    /// Error from the session store
    StoreError(String),
    /// Error during serialization/deserialization
    SerializationError(String),
    /// Signature on a cookie or signed payload did not verify
    InvalidSignature,
    /// Signed payload declares an algorithm other than HMAC-SHA256
    UnsupportedAlgorithm(String),
    /// Signed payload is missing a required field
    MissingField(&'static str),
    /// Cookie domain is neither the request host nor one of its parents
    DomainMismatch { host: String, domain: String },
    /// The response was already committed; no cookie can be written
    HeadersAlreadySent,
    /// Key rejected by a restricted storage
    UnsupportedKey(String),
    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    RedisError(redis::RedisError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            SessionError::InvalidSignature => write!(f, "Invalid signature"),
            SessionError::UnsupportedAlgorithm(alg) => {
                write!(f, "Unsupported signing algorithm: {}", alg)
            }
            SessionError::MissingField(field) => {
                write!(f, "Signed payload is missing field `{}`", field)
            }
            SessionError::DomainMismatch { host, domain } => {
                write!(f, "Cookie domain {} does not cover host {}", domain, host)
            }
            SessionError::HeadersAlreadySent => {
                write!(f, "Cookie could not be set, headers already sent")
            }
            SessionError::UnsupportedKey(key) => write!(f, "Unsupported key: {}", key),
            #[cfg(feature = "redis-store")]
            SessionError::RedisError(e) => write!(f, "Redis error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::RedisError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for SessionError {
    fn from(err: base64::DecodeError) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}
