//! Enumerations encoded by symbolic name.
//!
//! Each enum carries an explicit name table; decoding looks the stored string
//! up in that table and rejects names it does not know.

use propwire_bag::PropertyValue;

use crate::error::{CodecError, Result};

/// An enumeration whose variants travel as fixed name strings.
///
/// Usually implemented through [`wire_enum!`](crate::wire_enum).
pub trait WireEnum: Sized + Copy + 'static {
    const TYPE_NAME: &'static str;

    fn variants() -> &'static [Self];

    fn wire_name(&self) -> &'static str;

    fn from_wire_name(name: &str) -> Option<Self> {
        Self::variants()
            .iter()
            .copied()
            .find(|v| v.wire_name() == name)
    }
}

#[doc(hidden)]
pub fn decode_wire_enum<E: WireEnum>(key: &str, value: PropertyValue) -> Result<E> {
    match value {
        PropertyValue::Str(name) => E::from_wire_name(&name).ok_or_else(|| {
            CodecError::mismatch(key, E::TYPE_NAME, format!("unknown variant `{name}`"))
        }),
        other => Err(CodecError::mismatch(key, E::TYPE_NAME, other.kind().as_str())),
    }
}

/// Declares an enum together with its wire-name table.
///
/// ```
/// propwire::wire_enum! {
///     pub enum Priority {
///         Low => "LOW",
///         High => "HIGH",
///     }
/// }
///
/// use propwire::WireEnum;
/// assert_eq!(Priority::High.wire_name(), "HIGH");
/// assert_eq!(Priority::from_wire_name("LOW"), Some(Priority::Low));
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $crate::WireEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }

            fn wire_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl $crate::Scalar for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn to_property(&self) -> $crate::PropertyValue {
                $crate::PropertyValue::Str(
                    <Self as $crate::WireEnum>::wire_name(self).to_owned(),
                )
            }

            fn from_property(
                key: &str,
                value: $crate::PropertyValue,
            ) -> $crate::Result<Self> {
                $crate::wire_enum::decode_wire_enum(key, value)
            }
        }
    };
}
