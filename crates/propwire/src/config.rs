//! Codec configuration.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use propwire_bag::{IdentifierSanitizer, IdentitySanitizer, NameSanitizer};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fields::DEFAULT_MAP_KEY;

pub const DEFAULT_MAX_EXCEPTION_DEPTH: usize = 64;

/// Which [`NameSanitizer`] header names go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizerKind {
    #[default]
    Identifier,
    Identity,
}

/// Settings shared by encoders and decoders.
///
/// ```toml
/// max_exception_depth = 32
/// default_map_key = "Key"
/// message_signature = "v3"
/// sanitizer = "identifier"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Upper bound on the number of causes written for one chain.
    pub max_exception_depth: usize,
    pub default_map_key: String,
    /// Signature stamped by [`Encoder::stamp_signature`](crate::Encoder::stamp_signature).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_signature: Option<String>,
    pub sanitizer: SanitizerKind,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_exception_depth: DEFAULT_MAX_EXCEPTION_DEPTH,
            default_map_key: DEFAULT_MAP_KEY.to_owned(),
            message_signature: None,
            sanitizer: SanitizerKind::default(),
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_exception_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_exception_depth must be at least 1".into(),
            ));
        }
        if self.default_map_key.is_empty() || self.default_map_key.contains('.') {
            return Err(ConfigError::Invalid(format!(
                "default_map_key `{}` must be non-empty and free of `.`",
                self.default_map_key
            )));
        }
        Ok(())
    }

    pub fn sanitizer(&self) -> Arc<dyn NameSanitizer> {
        match self.sanitizer {
            SanitizerKind::Identifier => Arc::new(IdentifierSanitizer),
            SanitizerKind::Identity => Arc::new(IdentitySanitizer),
        }
    }
}
