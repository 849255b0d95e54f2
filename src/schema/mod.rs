//! Schema Discovery & Layout Resolution
//!
//! This module turns the definition text carried by a message into the
//! ordered field layout used to decode its payloads.
//!
//! # Architecture
//!
//! The schema system follows a layered approach:
//! - Definition parsing splits the text into a root field list and a
//!   [`TypeTable`] of named nested types ([`definition`])
//! - Flattening expands composite fields depth-first into dotted-path
//!   primitive fields ([`flatten`])
//! - [`ChannelSchema`] bundles both results; it is built once per channel and
//!   shared read-only with every decode
//!
//! # Example
//!
//! ```rust
//! use msgscope::schema::ChannelSchema;
//!
//! let text = "Header header\n=====\nMSG: std_msgs/Header\nuint32 seq\ntime stamp";
//! let schema = ChannelSchema::build(text, 32).unwrap();
//! assert_eq!(schema.flattened().paths(), ["header.seq", "header.stamp"]);
//! ```

pub mod definition;
pub mod flatten;
mod type_table;

pub use definition::{MessageDefinition, SkippedLine, parse_definition};
pub use flatten::{DEFAULT_MAX_NESTING_DEPTH, MAX_EXPANDED_ENTRIES, flatten};
pub use type_table::TypeTable;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::types::{FlattenedSchema, InboundMessage};

/// Resolved layout of one channel's message type.
#[derive(Debug, Clone)]
pub struct ChannelSchema {
    /// Fully qualified type name from the initializing message (may be empty)
    pub datatype: String,
    /// Checksum from the initializing message (may be empty)
    pub md5sum: String,
    /// Definition text the schema was built from
    pub source: Arc<str>,
    /// Parsed definition, including parse diagnostics
    pub definition: MessageDefinition,
    /// Primitive fields in decode order
    pub flattened: FlattenedSchema,
}

impl ChannelSchema {
    /// Parse and flatten definition text.
    pub fn build(definition_text: &str, max_depth: usize) -> Result<Self> {
        Self::build_typed("", "", Arc::from(definition_text), max_depth)
    }

    /// Build the schema from the definition carried by a message.
    pub fn from_message(message: &InboundMessage, max_depth: usize) -> Result<Self> {
        let source = Arc::clone(&message.definition);
        Self::build_typed(&message.datatype, &message.md5sum, source, max_depth)
    }

    fn build_typed(
        datatype: &str,
        md5sum: &str,
        source: Arc<str>,
        max_depth: usize,
    ) -> Result<Self> {
        debug!(datatype, md5sum, definition = %source, "Resolving message definition");

        let definition = MessageDefinition::parse(&source);
        let flattened = flatten(&definition.root_fields, &definition.type_table, max_depth)?;

        if flattened.has_unresolved() {
            let dropped: Vec<String> = flattened
                .unresolved
                .iter()
                .map(|u| format!("{}:{}", u.path, u.type_name))
                .collect();
            warn!(
                datatype,
                count = dropped.len(),
                dropped = ?dropped,
                "Fields with undefined or unsupported types will be missing from every record"
            );
        }

        info!(
            datatype,
            fields = flattened.len(),
            nested_types = definition.type_table.len(),
            skipped_lines = definition.skipped_lines.len(),
            "Message definition resolved"
        );

        Ok(Self {
            datatype: datatype.to_string(),
            md5sum: md5sum.to_string(),
            source,
            definition,
            flattened,
        })
    }

    /// Primitive fields in decode order.
    pub fn flattened(&self) -> &FlattenedSchema {
        &self.flattened
    }

    /// Nested type definitions.
    pub fn type_table(&self) -> &TypeTable {
        &self.definition.type_table
    }

    /// Whether a message appears to carry a different definition than the one
    /// this schema was built from.
    ///
    /// Checksums are compared when both sides have one, definition text
    /// otherwise.
    pub fn differs_from(&self, message: &InboundMessage) -> bool {
        if !self.md5sum.is_empty() && !message.md5sum.is_empty() {
            return self.md5sum != message.md5sum;
        }
        !Arc::ptr_eq(&self.source, &message.definition) && *self.source != *message.definition
    }
}
