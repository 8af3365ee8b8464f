//! The [`Scalar`] trait: typed values that occupy exactly one bag field.

use propwire_bag::PropertyValue;
use time::OffsetDateTime;

use crate::error::{CodecError, Result};

/// A typed value stored in a single bag field.
///
/// `to_property` returning [`PropertyValue::Null`] means "nothing to write":
/// the encoder skips the key entirely, so absence stands for null on the
/// wire. `absent` decides what a missing key decodes to.
pub trait Scalar: Sized {
    /// Type name used in mismatch reports.
    const TYPE_NAME: &'static str;

    fn to_property(&self) -> PropertyValue;

    fn from_property(key: &str, value: PropertyValue) -> Result<Self>;

    /// Value of a missing key, or `None` when the key is required.
    fn absent() -> Option<Self> {
        None
    }
}

fn mismatch<T: Scalar>(key: &str, value: &PropertyValue) -> CodecError {
    CodecError::mismatch(key, T::TYPE_NAME, value.kind().as_str())
}

impl Scalar for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Bool(*self)
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

impl Scalar for i32 {
    const TYPE_NAME: &'static str = "int";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Int(*self)
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Int(i) => Ok(i),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

impl Scalar for i64 {
    const TYPE_NAME: &'static str = "long";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Long(*self)
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Long(l) => Ok(l),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

impl Scalar for f64 {
    const TYPE_NAME: &'static str = "double";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Double(*self)
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Double(d) => Ok(d),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

impl Scalar for String {
    const TYPE_NAME: &'static str = "string";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Str(self.clone())
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

impl Scalar for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Bytes(self.clone())
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Bytes(b) => Ok(b),
            other => Err(mismatch::<Self>(key, &other)),
        }
    }
}

/// The opaque-object slot: any stored variant is accepted as-is.
impl Scalar for PropertyValue {
    const TYPE_NAME: &'static str = "object";

    fn to_property(&self) -> PropertyValue {
        self.clone()
    }

    fn from_property(_key: &str, value: PropertyValue) -> Result<Self> {
        Ok(value)
    }
}

/// Dates travel as `Long` milliseconds since the Unix epoch.
impl Scalar for OffsetDateTime {
    const TYPE_NAME: &'static str = "date";

    fn to_property(&self) -> PropertyValue {
        PropertyValue::Long(epoch_millis(*self))
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        let millis = match value {
            PropertyValue::Long(l) => l,
            other => return Err(mismatch::<Self>(key, &other)),
        };
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_err(|_| CodecError::mismatch(key, Self::TYPE_NAME, format!("{millis}ms")))
    }
}

/// Milliseconds since the Unix epoch, rounded towards negative infinity.
pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    at.unix_timestamp_nanos().div_euclid(1_000_000) as i64
}

impl<T: Scalar> Scalar for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn to_property(&self) -> PropertyValue {
        self.as_ref().map_or(PropertyValue::Null, Scalar::to_property)
    }

    fn from_property(key: &str, value: PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::Null => Ok(None),
            other => T::from_property(key, other).map(Some),
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}
