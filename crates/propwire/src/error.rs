//! Codec error types.

use propwire_bag::BagError;
use thiserror::Error;

/// Error type for encode and decode passes.
///
/// The variants separate "absent" from "malformed" from "transport-level":
/// nothing is retried or defaulted at this layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("transport rejected write of `{key}`: {reason}")]
    TransportWrite { key: String, reason: String },
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl CodecError {
    pub(crate) fn mismatch(key: &str, expected: &str, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            key: key.to_owned(),
            expected: expected.to_owned(),
            found: found.into(),
        }
    }
}

impl From<BagError> for CodecError {
    fn from(err: BagError) -> Self {
        match err {
            BagError::WriteRejected { key, reason } => CodecError::TransportWrite { key, reason },
            BagError::MissingField(key) => CodecError::MissingField(key),
            BagError::TypeMismatch {
                key,
                expected,
                found,
            } => CodecError::TypeMismatch {
                key,
                expected: expected.to_string(),
                found: found.to_string(),
            },
        }
    }
}

/// Error type for loading a [`CodecConfig`](crate::CodecConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse codec config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid codec config: {0}")]
    Invalid(String),
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
