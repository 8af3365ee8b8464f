use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Line number of a frame executing native code.
pub const NATIVE_LINE: i32 = -2;

/// One entry of a call stack.
///
/// A negative `line_number` means the line is unknown; [`NATIVE_LINE`] marks
/// a native routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallFrame {
    pub declaring_class: String,
    pub method_name: String,
    pub file_name: Option<String>,
    pub line_number: i32,
}

impl CallFrame {
    pub fn new(
        declaring_class: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<&str>,
        line_number: i32,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            method_name: method_name.into(),
            file_name: file_name.map(str::to_owned),
            line_number,
        }
    }

    /// A frame pointing at a source location in this process.
    pub fn local(location: &Location<'_>, method_name: &str) -> Self {
        Self {
            declaring_class: module_of(location.file()),
            method_name: method_name.to_owned(),
            file_name: Some(location.file().to_owned()),
            line_number: i32::try_from(location.line()).unwrap_or(-1),
        }
    }

    pub fn is_native(&self) -> bool {
        self.line_number == NATIVE_LINE
    }
}

/// `src/codec/decoder.rs` -> `codec::decoder`
fn module_of(file: &str) -> String {
    let trimmed = file.strip_suffix(".rs").unwrap_or(file);
    let trimmed = trimmed
        .rsplit_once("src/")
        .map_or(trimmed, |(_, rest)| rest);
    trimmed.replace(['/', '\\'], "::")
}

impl fmt::Display for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_class, self.method_name)?;
        match (&self.file_name, self.line_number) {
            _ if self.is_native() => f.write_str("Native Method")?,
            (Some(file), line) if line >= 0 => write!(f, "{file}:{line}")?,
            (Some(file), _) => f.write_str(file)?,
            (None, _) => f.write_str("Unknown Source")?,
        }
        f.write_str(")")
    }
}
