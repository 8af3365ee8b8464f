//! Property bag error type.

use thiserror::Error;

use crate::ValueKind;

/// Error type for property bag reads and writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BagError {
    #[error("bag rejected write of `{key}`: {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{key}` holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl BagError {
    pub fn mismatch(key: &str, expected: ValueKind, found: ValueKind) -> Self {
        BagError::TypeMismatch {
            key: key.to_owned(),
            expected,
            found,
        }
    }
}
