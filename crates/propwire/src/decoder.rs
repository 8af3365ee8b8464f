//! [`Decoder`]: reads typed values back out of a property bag.

use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;
use std::panic::Location;
use std::sync::Arc;

use propwire_bag::{NameSanitizer, PropertyBag, PropertyValue};
use time::OffsetDateTime;

use crate::error::{CodecError, Result};
use crate::exception::{CallFrame, RemoteException};
use crate::fields::{self, count_key, element_key, member_key};
use crate::{CodecConfig, Locale, Scalar, Uri};

/// Stateful reader over one property bag.
///
/// Decoding never mutates the bag, so every operation can be repeated and
/// yields the same result. Header names are sanitized exactly as the
/// [`Encoder`](crate::Encoder) sanitizes them.
pub struct Decoder<'a, B: PropertyBag + ?Sized> {
    bag: &'a B,
    sanitizer: Arc<dyn NameSanitizer>,
    config: CodecConfig,
}

impl<'a, B: PropertyBag + ?Sized> Decoder<'a, B> {
    pub fn new(bag: &'a B) -> Self {
        Self::with_config(bag, &CodecConfig::default())
    }

    pub fn with_config(bag: &'a B, config: &CodecConfig) -> Self {
        Self {
            bag,
            sanitizer: config.sanitizer(),
            config: config.clone(),
        }
    }

    pub fn with_sanitizer(bag: &'a B, sanitizer: Arc<dyn NameSanitizer>) -> Self {
        Self {
            bag,
            sanitizer,
            config: CodecConfig::default(),
        }
    }

    fn header_key<'n>(&self, name: &'n str) -> Cow<'n, str> {
        self.sanitizer.sanitize(name)
    }

    // ---------------------------------------------------------------------
    // Scalars
    // ---------------------------------------------------------------------

    /// Reads the body field `key`; `None` when it is absent.
    pub fn get_scalar<T: Scalar>(&self, key: &str) -> Result<Option<T>> {
        match self.bag.value(key) {
            Some(stored) => T::from_property(key, stored.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the body field `key`, failing with [`CodecError::MissingField`]
    /// when it is absent and `T` has no null.
    pub fn require_scalar<T: Scalar>(&self, key: &str) -> Result<T> {
        match self.bag.value(key) {
            Some(stored) => T::from_property(key, stored.clone()),
            None => T::absent().ok_or_else(|| CodecError::MissingField(key.to_owned())),
        }
    }

    pub fn get_header_scalar<T: Scalar>(&self, name: &str) -> Result<Option<T>> {
        self.get_scalar(&self.header_key(name))
    }

    pub fn require_header_scalar<T: Scalar>(&self, name: &str) -> Result<T> {
        self.require_scalar(&self.header_key(name))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.require_scalar(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        self.require_scalar(key)
    }

    pub fn get_long(&self, key: &str) -> Result<i64> {
        self.require_scalar(key)
    }

    pub fn get_double(&self, key: &str) -> Result<f64> {
        self.require_scalar(key)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_scalar(key)
    }

    pub fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_scalar(key)
    }

    pub fn get_object(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.get_scalar(key)
    }

    pub fn get_date(&self, key: &str) -> Result<Option<OffsetDateTime>> {
        self.get_scalar(key)
    }

    pub fn get_locale(&self, key: &str) -> Result<Option<Locale>> {
        self.get_scalar(key)
    }

    pub fn get_uri(&self, key: &str) -> Result<Option<Uri>> {
        self.get_scalar(key)
    }

    /// Reads a [`wire_enum!`](crate::wire_enum) value by name.
    pub fn get_enum<E: Scalar>(&self, key: &str) -> Result<Option<E>> {
        self.get_scalar(key)
    }

    pub fn get_bool_property(&self, name: &str) -> Result<bool> {
        self.require_header_scalar(name)
    }

    pub fn get_int_property(&self, name: &str) -> Result<i32> {
        self.require_header_scalar(name)
    }

    pub fn get_long_property(&self, name: &str) -> Result<i64> {
        self.require_header_scalar(name)
    }

    pub fn get_double_property(&self, name: &str) -> Result<f64> {
        self.require_header_scalar(name)
    }

    pub fn get_string_property(&self, name: &str) -> Result<Option<String>> {
        self.get_header_scalar(name)
    }

    pub fn get_object_property(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.get_header_scalar(name)
    }

    pub fn get_message_signature(&self) -> Result<Option<String>> {
        self.get_string_property(fields::MESSAGE_SIGNATURE)
    }

    // ---------------------------------------------------------------------
    // Sequences and maps
    // ---------------------------------------------------------------------

    /// Reads `<prefix>Count`.
    ///
    /// `None` means no collection was encoded under `prefix`, which is
    /// distinct from `Some(0)`, an encoded empty one.
    pub fn decode_collection_size(&self, prefix: &str) -> Result<Option<usize>> {
        let key = count_key(prefix);
        match self.get_scalar::<i32>(&key)? {
            Some(count) => usize::try_from(count)
                .map(Some)
                .map_err(|_| {
                    CodecError::mismatch(&key, "non-negative count", count.to_string())
                }),
            None => Ok(None),
        }
    }

    /// Reads `<prefix>0..<prefix>(Count-1)` into `out`, in index order.
    ///
    /// Returns `None` without touching `out` when no collection was encoded.
    /// A missing element decodes through [`Scalar::absent`]: `None` for
    /// `Option<T>` elements, [`CodecError::MissingField`] otherwise.
    pub fn decode_sequence<T, C>(&self, prefix: &str, mut out: C) -> Result<Option<C>>
    where
        T: Scalar,
        C: Extend<T>,
    {
        let Some(count) = self.decode_collection_size(prefix)? else {
            return Ok(None);
        };
        for i in 0..count {
            let element = self.require_scalar::<T>(&element_key(prefix, i))?;
            out.extend(Some(element));
        }
        tracing::trace!(prefix, count, "decoded sequence");
        Ok(Some(out))
    }

    pub fn decode_strings(&self, prefix: &str, out: Vec<String>) -> Result<Option<Vec<String>>> {
        self.decode_sequence::<String, _>(prefix, out)
    }

    /// Reads the pairs written by [`Encoder::encode_map`](crate::Encoder::encode_map)
    /// as opaque values. A missing key or value decodes to
    /// [`PropertyValue::Null`]; a repeated key keeps the highest index.
    pub fn decode_map(
        &self,
        prefix: &str,
        key_field: &str,
    ) -> Result<Option<HashMap<PropertyValue, PropertyValue>>> {
        let decoded =
            self.decode_map_as::<Option<PropertyValue>, Option<PropertyValue>>(prefix, key_field)?;
        Ok(decoded.map(|map| {
            map.into_iter()
                .map(|(k, v)| {
                    (
                        k.unwrap_or(PropertyValue::Null),
                        v.unwrap_or(PropertyValue::Null),
                    )
                })
                .collect()
        }))
    }

    /// [`decode_map`](Self::decode_map) with typed keys and values.
    pub fn decode_map_as<K, V>(
        &self,
        prefix: &str,
        key_field: &str,
    ) -> Result<Option<HashMap<K, V>>>
    where
        K: Scalar + Eq + Hash,
        V: Scalar,
    {
        let Some(count) = self.decode_collection_size(prefix)? else {
            return Ok(None);
        };
        let mut map = HashMap::new();
        for i in 0..count {
            let key = self.require_scalar::<K>(&member_key(prefix, i, key_field))?;
            let value = self.require_scalar::<V>(&member_key(prefix, i, fields::MAP_VALUE))?;
            map.insert(key, value);
        }
        tracing::trace!(prefix, count, distinct = map.len(), "decoded map");
        Ok(Some(map))
    }

    /// [`decode_map`](Self::decode_map) with the configured default key field.
    pub fn decode_map_default_key(
        &self,
        prefix: &str,
    ) -> Result<Option<HashMap<PropertyValue, PropertyValue>>> {
        self.decode_map(prefix, &self.config.default_map_key)
    }

    // ---------------------------------------------------------------------
    // Exception chains
    // ---------------------------------------------------------------------

    pub fn has_encoded_exception(&self) -> Result<bool> {
        Ok(self
            .get_header_scalar::<bool>(fields::EXCEPTION_FLAG)?
            .unwrap_or(false))
    }

    /// Rebuilds the encoded exception chain and returns its outermost
    /// exception.
    ///
    /// The caller's source location is appended to the outermost
    /// exception's frames so a report shows both the remote and the local
    /// call site. Fails with [`CodecError::InvalidState`] when the bag
    /// carries no exception, and with [`CodecError::TypeMismatch`] when the
    /// encoded chain is longer than the configured depth bound.
    #[track_caller]
    pub fn decode_exception_chain(&self) -> Result<RemoteException> {
        let local = CallFrame::local(Location::caller(), "decode_exception_chain");
        self.decode_exception_chain_with_local_frames(vec![local])
    }

    /// Like [`decode_exception_chain`](Self::decode_exception_chain), with
    /// an explicit list of local frames to append.
    pub fn decode_exception_chain_with_local_frames(
        &self,
        local_frames: Vec<CallFrame>,
    ) -> Result<RemoteException> {
        if !self.has_encoded_exception()? {
            return Err(CodecError::InvalidState(
                "decode_exception_chain called on a bag without an encoded exception",
            ));
        }
        let count = self
            .decode_collection_size(fields::EXCEPTION_PREFIX)?
            .ok_or_else(|| CodecError::MissingField(count_key(fields::EXCEPTION_PREFIX)))?;
        let limit = self.config.max_exception_depth;
        if count > limit {
            return Err(CodecError::mismatch(
                &count_key(fields::EXCEPTION_PREFIX),
                &format!("exception count of at most {limit}"),
                count.to_string(),
            ));
        }

        let mut rebuilt: Option<RemoteException> = None;
        for index in (0..count).rev() {
            rebuilt = Some(self.decode_exception(index, rebuilt.take())?);
        }
        let Some(mut outermost) = rebuilt else {
            return Err(CodecError::InvalidState("encoded exception chain is empty"));
        };
        outermost.append_frames(local_frames);
        tracing::debug!(count, class = outermost.class_name(), "decoded exception chain");
        Ok(outermost)
    }

    fn decode_exception(
        &self,
        index: usize,
        cause: Option<RemoteException>,
    ) -> Result<RemoteException> {
        let prefix = fields::exception_prefix(index);
        let class_name: String =
            self.require_scalar(&format!("{prefix}{}", fields::CLASS_NAME))?;
        let message: Option<String> =
            self.get_scalar(&format!("{prefix}{}", fields::MESSAGE))?;

        let frame_prefix = fields::frame_prefix(index);
        let frame_count = self
            .decode_collection_size(&frame_prefix)?
            .ok_or_else(|| CodecError::MissingField(count_key(&frame_prefix)))?;
        let mut frames = Vec::new();
        for j in 0..frame_count {
            let key = |field| member_key(&frame_prefix, j, field);
            frames.push(CallFrame {
                declaring_class: self.require_scalar(&key(fields::DECLARING_CLASS))?,
                method_name: self.require_scalar(&key(fields::METHOD_NAME))?,
                file_name: self.get_scalar(&key(fields::FILE_NAME))?,
                line_number: self.require_scalar(&key(fields::LINE_NUMBER))?,
            });
        }

        Ok(RemoteException::new(class_name, message, frames, cause))
    }
}
