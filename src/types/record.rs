//! Decoded records and by-path lookups.
//!
//! A [`DecodedRecord`] is the flat `(path, value)` list produced for one
//! payload. Lookups by path are linear scans; records are small and the
//! ordered list is the primary interface, so no index is built.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Time, Value};

/// One decoded primitive with its dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedField {
    pub path: String,
    pub value: Value,
}

impl DecodedField {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self { path: path.into(), value }
    }
}

/// All fields decoded from one payload, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    /// Decoded fields in flattened-schema order
    pub fields: Vec<DecodedField>,
    /// Bytes consumed from the payload
    pub consumed: usize,
    /// Per-channel message counter (0 for the first message)
    pub sequence: u64,
    /// Serialized payload the record was decoded from
    ///
    /// Filled in by [`Channel`](crate::Channel); empty for records produced
    /// directly by a [`RecordDecoder`](crate::RecordDecoder).
    #[serde(skip)]
    pub payload: Arc<[u8]>,
}

impl DecodedRecord {
    pub fn new(fields: Vec<DecodedField>, consumed: usize) -> Self {
        Self { fields, consumed, sequence: 0, payload: Arc::default() }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodedField> {
        self.fields.iter()
    }

    /// Value at a dotted path, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.path == path).map(|f| &f.value)
    }

    /// Convenience typed helpers
    pub fn u8(&self, path: &str) -> Option<u8> {
        match self.get(path)? {
            Value::UInt8(v) => Some(*v),
            _ => None,
        }
    }
    pub fn u16(&self, path: &str) -> Option<u16> {
        match self.get(path)? {
            Value::UInt16(v) => Some(*v),
            _ => None,
        }
    }
    pub fn u32(&self, path: &str) -> Option<u32> {
        match self.get(path)? {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }
    pub fn u64(&self, path: &str) -> Option<u64> {
        match self.get(path)? {
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn string(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }
    pub fn time(&self, path: &str) -> Option<Time> {
        self.get(path)?.as_time()
    }

    /// `(path, value)` pairs, the shape handed to consumers.
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        self.fields.iter().map(|f| (f.path.clone(), f.value.clone())).collect()
    }
}

impl<'a> IntoIterator for &'a DecodedRecord {
    type Item = &'a DecodedField;
    type IntoIter = std::slice::Iter<'a, DecodedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
