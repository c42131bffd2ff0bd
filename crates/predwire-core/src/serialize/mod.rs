//! Transport bytes for the logical document.
//!
//! Format-level only: nothing here knows about node kinds. Callers pass
//! explicit size limits; the decode entry points take them from
//! `PredicateConfig::max_document_bytes`.

mod cbor;
mod json;

#[cfg(test)]
mod tests;

use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },
}

impl SerializeError {
    /// Return a stable error kind independent of backend error-message text.
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Serialize(_) => SerializeErrorKind::Serialize,
            Self::Deserialize(_) => SerializeErrorKind::Deserialize,
            Self::DeserializeSizeLimitExceeded { .. } => {
                SerializeErrorKind::DeserializeSizeLimitExceeded
            }
        }
    }
}

///
/// SerializeErrorKind
///
/// Stable error-kind taxonomy for serializer failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Serialize,
    Deserialize,
    DeserializeSizeLimitExceeded,
}

impl SerializeErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
            Self::DeserializeSizeLimitExceeded => "deserialize_size_limit_exceeded",
        }
    }
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value to CBOR bytes.
pub fn to_cbor<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::serialize(value)
}

/// Deserialize CBOR bytes, rejecting payloads larger than `max_bytes`.
pub fn from_cbor_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    cbor::deserialize_bounded(bytes, max_bytes)
}

/// Serialize a value to a JSON string.
pub fn to_json<T>(value: &T) -> Result<String, SerializeError>
where
    T: Serialize,
{
    json::serialize(value)
}

/// Deserialize JSON text, rejecting input larger than `max_bytes`.
pub fn from_json_bounded<T>(text: &str, max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    json::deserialize_bounded(text, max_bytes)
}

const fn check_size(len: usize, max_bytes: usize) -> Result<(), SerializeError> {
    if len > max_bytes {
        return Err(SerializeError::DeserializeSizeLimitExceeded { len, max_bytes });
    }

    Ok(())
}
