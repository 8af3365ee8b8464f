//! In-memory reference bag.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{BagError, PropertyBag, PropertyValue};

/// An insertion-ordered, in-process [`PropertyBag`].
///
/// Stands in for a real transport message. An optional field limit models
/// the transport's field budget: adding a new key past the limit is
/// rejected, overwriting an existing key is not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryBag {
    fields: IndexMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_limit: Option<usize>,
}

impl MemoryBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_limit(limit: usize) -> Self {
        Self {
            fields: IndexMap::new(),
            field_limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl PropertyBag for MemoryBag {
    fn set_value(&mut self, key: &str, value: PropertyValue) -> Result<(), BagError> {
        if let Some(limit) = self.field_limit {
            if self.fields.len() >= limit && !self.fields.contains_key(key) {
                return Err(BagError::WriteRejected {
                    key: key.to_owned(),
                    reason: format!("field limit of {limit} reached"),
                });
            }
        }
        self.fields.insert(key.to_owned(), value);
        Ok(())
    }

    fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.fields.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}
