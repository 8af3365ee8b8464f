//! [`Uri`]: a syntactically checked URI reference.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use propwire_bag::PropertyValue;
use regex::Regex;
use thiserror::Error;

use crate::error::{CodecError, Result};
use crate::Scalar;

/// A URI reference. Stored on the wire in its ASCII form: characters
/// outside ASCII are percent-encoded as UTF-8 octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid URI `{0}`")]
pub struct UriParseError(pub String);

fn uri_syntax() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?(?:[^\s"<>\\^`{|}%]|%[0-9A-Fa-f]{2})*$"#)
            .expect("static regex")
    })
}

impl Uri {
    pub fn parse(text: &str) -> std::result::Result<Self, UriParseError> {
        if uri_syntax().is_match(text) {
            Ok(Uri(text.to_owned()))
        } else {
            Err(UriParseError(text.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the scheme, if the reference is absolute.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        let valid = first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
        valid.then_some(scheme)
    }

    pub fn to_ascii_string(&self) -> String {
        if self.0.is_ascii() {
            return self.0.clone();
        }
        let mut out = String::with_capacity(self.0.len() * 2);
        for ch in self.0.chars() {
            if ch.is_ascii() {
                out.push(ch);
                continue;
            }
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
        out
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uri {
    type Err = UriParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl Scalar for Uri {
    const TYPE_NAME: &'static str = "uri";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Str(self.to_ascii_string())
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Str(s) => {
                Uri::parse(&s).map_err(|e| CodecError::mismatch(key, Self::TYPE_NAME, e.0))
            }
            other => Err(CodecError::mismatch(key, Self::TYPE_NAME, other.kind().as_str())),
        }
    }
}
