//! Sequential payload decoding against a flattened schema.
//!
//! Payloads carry no field tags, offsets or padding: fields are laid out
//! back to back in flattened-schema order, so the decoder keeps a single
//! cursor and advances it by each field's encoded width. Strings make the
//! width data-dependent, which is why offsets cannot be precomputed.
//!
//! Every read is bounds-checked. A payload that ends early fails with
//! [`MsgscopeError::OutOfBounds`](crate::MsgscopeError::OutOfBounds) naming
//! the field being decoded; the schema is never modified.

use tracing::trace;

use crate::Result;
use crate::types::{DecodedField, DecodedRecord, FlattenedSchema, MessageHeader, Value};

/// Decoder for payloads of one flattened schema.
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder<'a> {
    schema: &'a FlattenedSchema,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(schema: &'a FlattenedSchema) -> Self {
        Self { schema }
    }

    /// Decode a whole payload.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedRecord> {
        self.decode_at(data, 0)
    }

    /// Decode a payload whose first field starts at `start`.
    ///
    /// Bytes after the last field are allowed; [`DecodedRecord::consumed`]
    /// reports how many bytes the fields occupied.
    pub fn decode_at(&self, data: &[u8], start: usize) -> Result<DecodedRecord> {
        let mut fields = Vec::with_capacity(self.schema.len());
        let mut offset = start;

        for field in self.schema.iter() {
            let (value, width) =
                Value::decode(field.basic_type, data, offset).map_err(|e| e.with_field(&field.path))?;
            fields.push(DecodedField::new(field.path.as_str(), value));
            offset += width;
        }

        if offset < data.len() {
            trace!(trailing = data.len() - offset, "Payload has bytes after the last field");
        }

        Ok(DecodedRecord::new(fields, offset - start))
    }
}

/// Decode a `std_msgs/Header` starting at `start`.
///
/// Equivalent to flattening `Header header` and reading the three fields, for
/// callers that only need the header of an otherwise opaque payload.
pub fn decode_header(data: &[u8], start: usize) -> Result<MessageHeader> {
    MessageHeader::parse(data, start)
}
