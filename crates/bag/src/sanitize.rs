//! Header-name sanitization.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Rewrites header field names to satisfy transport naming restrictions.
///
/// Implementations must be pure and idempotent: the codec sanitizes on both
/// the write and the read side and relies on both producing the same key.
pub trait NameSanitizer: Send + Sync {
    fn sanitize<'a>(&self, name: &'a str) -> Cow<'a, str>;
}

/// Passes names through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySanitizer;

impl NameSanitizer for IdentitySanitizer {
    fn sanitize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }
}

/// Rewrites names into property identifiers: `[A-Za-z_$][A-Za-z0-9_$]*`.
///
/// Every other character becomes `_`, a leading digit gets a `_` prefix and
/// an empty name becomes `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierSanitizer;

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_$]").expect("static regex"))
}

impl NameSanitizer for IdentifierSanitizer {
    fn sanitize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if name.is_empty() {
            return Cow::Borrowed("_");
        }
        let replaced = invalid_chars().replace_all(name, "_");
        if replaced.starts_with(|c: char| c.is_ascii_digit()) {
            return Cow::Owned(format!("_{replaced}"));
        }
        replaced
    }
}
