//! Structured-value codec over flat, string-keyed property bags.
//!
//! An [`Encoder`] flattens typed values, sequences, maps and whole
//! exception chains into the fields of a [`PropertyBag`]; a [`Decoder`]
//! reads them back. The key layout is fixed (see [`fields`]) and is the
//! only contract between the two sides apart from the
//! [`MESSAGE_SIGNATURE`](fields::MESSAGE_SIGNATURE) field.
//!
//! ```
//! use propwire::{Decoder, Encoder, MemoryBag};
//!
//! let mut bag = MemoryBag::new();
//! let mut enc = Encoder::new(&mut bag);
//! enc.set_message_signature("v3").unwrap();
//! enc.set_bool_property("active", true).unwrap();
//! enc.encode_strings("tags", Some(&["a", "b"][..])).unwrap();
//!
//! let dec = Decoder::new(&bag);
//! assert_eq!(dec.get_message_signature().unwrap().as_deref(), Some("v3"));
//! assert!(dec.get_bool_property("active").unwrap());
//! assert_eq!(
//!     dec.decode_strings("tags", Vec::new()).unwrap(),
//!     Some(vec!["a".to_owned(), "b".to_owned()])
//! );
//! ```

mod config;
mod decoder;
mod encoder;
mod error;
mod locale;
mod scalar;
mod uri;

pub mod context;
pub mod exception;
pub mod fields;
pub mod wire_enum;

pub use config::{CodecConfig, SanitizerKind, DEFAULT_MAX_EXCEPTION_DEPTH};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodecError, ConfigError, Result};
pub use locale::{Locale, LocaleParseError};
pub use scalar::{epoch_millis, Scalar};
pub use uri::{Uri, UriParseError};
pub use wire_enum::WireEnum;

pub use propwire_bag::{
    BagError, IdentifierSanitizer, IdentitySanitizer, MemoryBag, NameSanitizer, PropertyBag,
    PropertyValue, ValueKind,
};
