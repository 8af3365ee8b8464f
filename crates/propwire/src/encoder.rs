//! [`Encoder`]: writes typed values into a property bag.

use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

use propwire_bag::{NameSanitizer, PropertyBag, PropertyValue};
use time::OffsetDateTime;

use crate::error::{CodecError, Result};
use crate::exception::{ChainStop, Fault, FaultGraph, FaultId};
use crate::fields::{self, count_key, element_key, member_key};
use crate::{CodecConfig, Locale, Scalar, Uri};

/// Stateful writer over one property bag.
///
/// Header fields (the `*_property` setters and [`set_header_scalar`]) pass
/// their name through the configured [`NameSanitizer`]; body fields are
/// written under the key as given. Null values are never written: a
/// `None` argument leaves the key absent.
///
/// [`set_header_scalar`]: Encoder::set_header_scalar
pub struct Encoder<'a, B: PropertyBag + ?Sized> {
    bag: &'a mut B,
    sanitizer: Arc<dyn NameSanitizer>,
    config: CodecConfig,
}

impl<'a, B: PropertyBag + ?Sized> Encoder<'a, B> {
    pub fn new(bag: &'a mut B) -> Self {
        Self::with_config(bag, &CodecConfig::default())
    }

    pub fn with_config(bag: &'a mut B, config: &CodecConfig) -> Self {
        Self {
            bag,
            sanitizer: config.sanitizer(),
            config: config.clone(),
        }
    }

    pub fn with_sanitizer(bag: &'a mut B, sanitizer: Arc<dyn NameSanitizer>) -> Self {
        Self {
            bag,
            sanitizer,
            config: CodecConfig::default(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn header_key<'n>(&self, name: &'n str) -> Cow<'n, str> {
        self.sanitizer.sanitize(name)
    }

    // ---------------------------------------------------------------------
    // Scalars
    // ---------------------------------------------------------------------

    /// Writes `value` under the body key `key` unless it is null.
    pub fn set_scalar<T: Scalar>(&mut self, key: &str, value: &T) -> Result<()> {
        match value.to_property() {
            PropertyValue::Null => Ok(()),
            stored => Ok(self.bag.set_value(key, stored)?),
        }
    }

    /// Writes `value` under the sanitized header name unless it is null.
    pub fn set_header_scalar<T: Scalar>(&mut self, name: &str, value: &T) -> Result<()> {
        let key = self.header_key(name);
        self.set_scalar(&key, value)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        Ok(self.bag.set_bool(key, value)?)
    }

    pub fn set_int(&mut self, key: &str, value: i32) -> Result<()> {
        Ok(self.bag.set_int(key, value)?)
    }

    pub fn set_long(&mut self, key: &str, value: i64) -> Result<()> {
        Ok(self.bag.set_long(key, value)?)
    }

    pub fn set_double(&mut self, key: &str, value: f64) -> Result<()> {
        Ok(self.bag.set_double(key, value)?)
    }

    pub fn set_string(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(s) => Ok(self.bag.set_string(key, s)?),
            None => Ok(()),
        }
    }

    pub fn set_bytes(&mut self, key: &str, value: Option<&[u8]>) -> Result<()> {
        match value {
            Some(b) => Ok(self.bag.set_bytes(key, b)?),
            None => Ok(()),
        }
    }

    pub fn set_object(&mut self, key: &str, value: &PropertyValue) -> Result<()> {
        self.set_scalar(key, value)
    }

    pub fn set_date(&mut self, key: &str, value: Option<OffsetDateTime>) -> Result<()> {
        self.set_scalar(key, &value)
    }

    pub fn set_locale(&mut self, key: &str, value: Option<&Locale>) -> Result<()> {
        self.set_scalar(key, &value.cloned())
    }

    pub fn set_uri(&mut self, key: &str, value: Option<&Uri>) -> Result<()> {
        self.set_scalar(key, &value.cloned())
    }

    /// Writes a [`wire_enum!`](crate::wire_enum) value by name.
    pub fn set_enum<E: Scalar>(&mut self, key: &str, value: Option<E>) -> Result<()> {
        self.set_scalar(key, &value)
    }

    pub fn set_bool_property(&mut self, name: &str, value: bool) -> Result<()> {
        self.set_header_scalar(name, &value)
    }

    pub fn set_int_property(&mut self, name: &str, value: i32) -> Result<()> {
        self.set_header_scalar(name, &value)
    }

    pub fn set_long_property(&mut self, name: &str, value: i64) -> Result<()> {
        self.set_header_scalar(name, &value)
    }

    pub fn set_double_property(&mut self, name: &str, value: f64) -> Result<()> {
        self.set_header_scalar(name, &value)
    }

    pub fn set_string_property(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.set_header_scalar(name, &value.map(str::to_owned))
    }

    pub fn set_object_property(&mut self, name: &str, value: &PropertyValue) -> Result<()> {
        self.set_header_scalar(name, value)
    }

    pub fn set_message_signature(&mut self, signature: &str) -> Result<()> {
        self.set_string_property(fields::MESSAGE_SIGNATURE, Some(signature))
    }

    /// Writes the configured signature, if any. Returns whether one was written.
    pub fn stamp_signature(&mut self) -> Result<bool> {
        match self.config.message_signature.clone() {
            Some(signature) => self.set_message_signature(&signature).map(|()| true),
            None => Ok(false),
        }
    }

    // ---------------------------------------------------------------------
    // Sequences and maps
    // ---------------------------------------------------------------------

    fn set_count(&mut self, prefix: &str, count: usize) -> Result<()> {
        let key = count_key(prefix);
        let count = i32::try_from(count).map_err(|_| CodecError::TransportWrite {
            key: key.clone(),
            reason: format!("count {count} exceeds int range"),
        })?;
        self.set_int(&key, count)
    }

    /// Writes `elements` at `<prefix>0..` followed by `<prefix>Count`.
    ///
    /// `None` writes nothing, so the decoder reports "no collection"; an
    /// empty slice still writes `Count = 0`. Null elements leave their
    /// index key absent.
    pub fn encode_sequence<T: Scalar>(
        &mut self,
        prefix: &str,
        elements: Option<&[T]>,
    ) -> Result<()> {
        let Some(elements) = elements else {
            return Ok(());
        };
        for (i, element) in elements.iter().enumerate() {
            self.set_scalar(&element_key(prefix, i), element)?;
        }
        self.set_count(prefix, elements.len())?;
        tracing::trace!(prefix, count = elements.len(), "encoded sequence");
        Ok(())
    }

    /// [`encode_sequence`](Self::encode_sequence) for borrowed strings.
    pub fn encode_strings<S: AsRef<str>>(
        &mut self,
        prefix: &str,
        elements: Option<&[S]>,
    ) -> Result<()> {
        let Some(elements) = elements else {
            return Ok(());
        };
        for (i, element) in elements.iter().enumerate() {
            self.set_string(&element_key(prefix, i), Some(element.as_ref()))?;
        }
        self.set_count(prefix, elements.len())?;
        tracing::trace!(prefix, count = elements.len(), "encoded sequence");
        Ok(())
    }

    /// Writes each pair at `<prefix><i>.<key_field>` / `<prefix><i>.Value`
    /// in iteration order, followed by `<prefix>Count`.
    pub fn encode_map<'m, K, V, I>(
        &mut self,
        prefix: &str,
        key_field: &str,
        map: Option<I>,
    ) -> Result<()>
    where
        K: Scalar + 'm,
        V: Scalar + 'm,
        I: IntoIterator<Item = (&'m K, &'m V)>,
    {
        let Some(map) = map else {
            return Ok(());
        };
        let mut count = 0;
        for (i, (key, value)) in map.into_iter().enumerate() {
            self.set_scalar(&member_key(prefix, i, key_field), key)?;
            self.set_scalar(&member_key(prefix, i, fields::MAP_VALUE), value)?;
            count = i + 1;
        }
        self.set_count(prefix, count)?;
        tracing::trace!(prefix, count, "encoded map");
        Ok(())
    }

    /// [`encode_map`](Self::encode_map) with the configured default key field.
    pub fn encode_map_default_key<'m, K, V, I>(
        &mut self,
        prefix: &str,
        map: Option<I>,
    ) -> Result<()>
    where
        K: Scalar + 'm,
        V: Scalar + 'm,
        I: IntoIterator<Item = (&'m K, &'m V)>,
    {
        let key_field = self.config.default_map_key.clone();
        self.encode_map(prefix, &key_field, map)
    }

    // ---------------------------------------------------------------------
    // Exception chains
    // ---------------------------------------------------------------------

    /// Flags the bag and writes the cause chain starting at `head`.
    ///
    /// Index 0 is `head`, the highest index the root cause. The walk visits
    /// each fault once and stops at the configured depth bound. Returns the
    /// number of causes written.
    pub fn encode_exception_chain(
        &mut self,
        graph: &FaultGraph,
        head: FaultId,
    ) -> Result<usize> {
        self.set_bool_property(fields::EXCEPTION_FLAG, true)?;

        let mut walk = graph.chain(head, self.config.max_exception_depth);
        let mut count = 0;
        for (index, (_, fault)) in walk.by_ref().enumerate() {
            self.encode_fault(index, fault)?;
            count = index + 1;
        }
        match walk.stop() {
            Some(ChainStop::Cycle(id)) => {
                tracing::warn!(count, ?id, "exception chain loops back on itself, truncated");
            }
            Some(ChainStop::DepthLimit) => {
                tracing::warn!(
                    count,
                    limit = self.config.max_exception_depth,
                    "exception chain exceeds depth bound, truncated"
                );
            }
            None => {}
        }

        self.set_count(fields::EXCEPTION_PREFIX, count)?;
        tracing::debug!(count, "encoded exception chain");
        Ok(count)
    }

    /// Captures `err` and its `source()` chain, then encodes it. The
    /// capture stops at the depth bound and at the first repeated source.
    pub fn encode_error(&mut self, err: &(dyn Error + 'static)) -> Result<usize> {
        let (graph, head) = FaultGraph::from_error(err, self.config.max_exception_depth);
        self.encode_exception_chain(&graph, head)
    }

    fn encode_fault(&mut self, index: usize, fault: &Fault) -> Result<()> {
        let prefix = fields::exception_prefix(index);
        self.set_string(
            &format!("{prefix}{}", fields::CLASS_NAME),
            Some(&fault.class_name),
        )?;
        self.set_string(
            &format!("{prefix}{}", fields::MESSAGE),
            fault.message.as_deref(),
        )?;

        let frame_prefix = fields::frame_prefix(index);
        for (j, frame) in fault.frames.iter().enumerate() {
            self.set_string(
                &member_key(&frame_prefix, j, fields::DECLARING_CLASS),
                Some(&frame.declaring_class),
            )?;
            self.set_string(
                &member_key(&frame_prefix, j, fields::METHOD_NAME),
                Some(&frame.method_name),
            )?;
            self.set_string(
                &member_key(&frame_prefix, j, fields::FILE_NAME),
                frame.file_name.as_deref(),
            )?;
            self.set_int(
                &member_key(&frame_prefix, j, fields::LINE_NUMBER),
                frame.line_number,
            )?;
        }
        self.set_count(&frame_prefix, fault.frames.len())
    }
}
