//! Flat property bag interface for propwire.
//!
//! A property bag is the transport-side container the codec writes into:
//! string keys mapped to a closed set of primitive values. This crate holds
//! the interface the codec consumes ([`PropertyBag`], [`NameSanitizer`]),
//! the value model ([`PropertyValue`]) and an in-memory bag used by tests
//! and tooling ([`MemoryBag`]).

mod bag;
mod error;
mod memory;
mod sanitize;
mod value;

pub use bag::PropertyBag;
pub use error::BagError;
pub use memory::MemoryBag;
pub use sanitize::{IdentifierSanitizer, IdentitySanitizer, NameSanitizer};
pub use value::{PropertyValue, ValueKind};
