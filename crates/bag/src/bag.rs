//! The [`PropertyBag`] transport interface.

use crate::{BagError, PropertyValue, ValueKind};

/// A flat, string-keyed container of typed fields.
///
/// Implementors supply raw storage (`set_value`, `value`, `keys`); the typed
/// accessors are provided on top of it. Typed getters never coerce: a field
/// stored as `Int` read through `get_long` is a [`BagError::TypeMismatch`].
pub trait PropertyBag {
    /// Stores `value` under `key`, replacing any previous value.
    fn set_value(&mut self, key: &str, value: PropertyValue) -> Result<(), BagError>;

    /// Returns the value stored under `key`, if any.
    fn value(&self, key: &str) -> Option<&PropertyValue>;

    /// Returns every key currently present.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn set_bool(&mut self, key: &str, v: bool) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Bool(v))
    }

    fn set_int(&mut self, key: &str, v: i32) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Int(v))
    }

    fn set_long(&mut self, key: &str, v: i64) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Long(v))
    }

    fn set_double(&mut self, key: &str, v: f64) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Double(v))
    }

    fn set_string(&mut self, key: &str, v: &str) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Str(v.to_owned()))
    }

    fn set_bytes(&mut self, key: &str, v: &[u8]) -> Result<(), BagError> {
        self.set_value(key, PropertyValue::Bytes(v.to_vec()))
    }

    fn set_object(&mut self, key: &str, v: PropertyValue) -> Result<(), BagError> {
        self.set_value(key, v)
    }

    fn get_object(&self, key: &str) -> Result<PropertyValue, BagError> {
        self.value(key)
            .cloned()
            .ok_or_else(|| BagError::MissingField(key.to_owned()))
    }

    fn get_bool(&self, key: &str) -> Result<bool, BagError> {
        match required(self, key)? {
            PropertyValue::Bool(b) => Ok(*b),
            other => Err(BagError::mismatch(key, ValueKind::Bool, other.kind())),
        }
    }

    fn get_int(&self, key: &str) -> Result<i32, BagError> {
        match required(self, key)? {
            PropertyValue::Int(i) => Ok(*i),
            other => Err(BagError::mismatch(key, ValueKind::Int, other.kind())),
        }
    }

    fn get_long(&self, key: &str) -> Result<i64, BagError> {
        match required(self, key)? {
            PropertyValue::Long(l) => Ok(*l),
            other => Err(BagError::mismatch(key, ValueKind::Long, other.kind())),
        }
    }

    fn get_double(&self, key: &str) -> Result<f64, BagError> {
        match required(self, key)? {
            PropertyValue::Double(d) => Ok(*d),
            other => Err(BagError::mismatch(key, ValueKind::Double, other.kind())),
        }
    }

    fn get_string(&self, key: &str) -> Result<String, BagError> {
        match required(self, key)? {
            PropertyValue::Str(s) => Ok(s.clone()),
            other => Err(BagError::mismatch(key, ValueKind::Str, other.kind())),
        }
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, BagError> {
        match required(self, key)? {
            PropertyValue::Bytes(b) => Ok(b.clone()),
            other => Err(BagError::mismatch(key, ValueKind::Bytes, other.kind())),
        }
    }
}

fn required<'a, B: PropertyBag + ?Sized>(
    bag: &'a B,
    key: &str,
) -> Result<&'a PropertyValue, BagError> {
    bag.value(key)
        .ok_or_else(|| BagError::MissingField(key.to_owned()))
}
