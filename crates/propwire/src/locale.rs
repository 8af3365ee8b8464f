//! [`Locale`]: language/country/variant triple with a canonical string form.

use std::fmt;
use std::str::FromStr;

use propwire_bag::PropertyValue;
use thiserror::Error;

use crate::error::{CodecError, Result};
use crate::Scalar;

/// A locale identifier, stored on the wire as `language[_COUNTRY[_variant]]`.
///
/// Language is normalized to lowercase and country to uppercase. An empty
/// country with a variant keeps both separators (`en__POSIX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Locale {
    language: String,
    country: String,
    variant: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid locale `{0}`")]
pub struct LocaleParseError(pub String);

impl Locale {
    /// Language and country must be ASCII alphanumeric and the variant
    /// free of whitespace, so the string form parses back to the same value.
    pub fn new(
        language: &str,
        country: &str,
        variant: &str,
    ) -> std::result::Result<Self, LocaleParseError> {
        let alnum = |p: &str| p.chars().all(|c| c.is_ascii_alphanumeric());
        if !alnum(language) || !alnum(country) || variant.chars().any(char::is_whitespace) {
            return Err(LocaleParseError(format!("{language}_{country}_{variant}")));
        }
        Ok(Self {
            language: language.to_ascii_lowercase(),
            country: country.to_ascii_uppercase(),
            variant: variant.to_owned(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if !self.country.is_empty() || !self.variant.is_empty() {
            write!(f, "_{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '_');
        let language = parts.next().unwrap_or_default();
        let country = parts.next().unwrap_or_default();
        let variant = parts.next().unwrap_or_default();
        Locale::new(language, country, variant).map_err(|_| LocaleParseError(s.to_owned()))
    }
}

impl Scalar for Locale {
    const TYPE_NAME: &'static str = "locale";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Str(self.to_string())
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Str(s) => s
                .parse()
                .map_err(|e: LocaleParseError| CodecError::mismatch(key, Self::TYPE_NAME, e.0)),
            other => Err(CodecError::mismatch(key, Self::TYPE_NAME, other.kind().as_str())),
        }
    }
}
