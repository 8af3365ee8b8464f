//! Reserved field names and the prefix/index key convention.
//!
//! Variable-length structures flatten to `<prefix>Count` plus one key per
//! element: `<prefix><i>` for sequences, `<prefix><i>.<KeyField>` and
//! `<prefix><i>.Value` for map pairs.

/// Header flag marking a bag that carries an encoded exception chain.
pub const EXCEPTION_FLAG: &str = "BVException";
/// Header field holding the payload format signature.
pub const MESSAGE_SIGNATURE: &str = "MessageSignature";

pub const COUNT_SUFFIX: &str = "Count";
pub const DEFAULT_MAP_KEY: &str = "Key";
pub const MAP_VALUE: &str = "Value";

/// Sequence prefix of the exception chain (`Exception_Count`, `Exception_<i>.`).
pub const EXCEPTION_PREFIX: &str = "Exception_";
pub const CLASS_NAME: &str = "ClassName";
pub const MESSAGE: &str = "Message";
/// Sequence prefix of one exception's frames, relative to `Exception_<i>.`.
pub const STACK_FRAME_PREFIX: &str = "StackFrame_";
pub const DECLARING_CLASS: &str = "DeclaringClass";
pub const METHOD_NAME: &str = "MethodName";
pub const FILE_NAME: &str = "FileName";
pub const LINE_NUMBER: &str = "LineNumber";

/// `<prefix>Count`
pub fn count_key(prefix: &str) -> String {
    format!("{prefix}{COUNT_SUFFIX}")
}

/// `<prefix><index>`
pub fn element_key(prefix: &str, index: usize) -> String {
    format!("{prefix}{index}")
}

/// `<prefix><index>.<field>`
pub fn member_key(prefix: &str, index: usize, field: &str) -> String {
    format!("{prefix}{index}.{field}")
}

/// `Exception_<index>.`
pub(crate) fn exception_prefix(index: usize) -> String {
    format!("{EXCEPTION_PREFIX}{index}.")
}

/// `Exception_<index>.StackFrame_`
pub(crate) fn frame_prefix(exception: usize) -> String {
    format!("{EXCEPTION_PREFIX}{exception}.{STACK_FRAME_PREFIX}")
}
