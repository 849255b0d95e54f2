//! Core types for schema-driven message decoding.
//!
//! This module provides the data structures shared by the parser, flattener,
//! decoder and channel layers.
//!
//! ## Architecture
//!
//! - [`Field`] is a `<type> <name>` declaration from a message definition
//! - [`BasicType`] is the fixed allowlist of directly decodable types
//! - [`FlattenedSchema`] is the ordered list of primitive fields for a message
//! - [`WireData`] decodes basic types from little-endian payload bytes
//! - [`DecodedRecord`] is the flat `(path, value)` output for one payload
//! - [`InboundMessage`] is the envelope a transport hands to a channel
//!
//! ## Usage Example
//!
//! ```rust
//! use msgscope::types::{BasicType, FlattenedField, FlattenedSchema, Value};
//!
//! let schema = FlattenedSchema::new(
//!     vec![
//!         FlattenedField::new("seq", BasicType::UInt32),
//!         FlattenedField::new("frame_id", BasicType::String),
//!     ],
//!     vec![],
//! );
//! assert_eq!(schema.paths(), ["seq", "frame_id"]);
//! assert_eq!(schema.fixed_size(), None); // strings are length-prefixed
//!
//! let (value, width) = Value::decode(BasicType::UInt16, &[0x01, 0x02], 0).unwrap();
//! assert_eq!(value, Value::UInt16(513));
//! assert_eq!(width, 2);
//! ```

mod basic_type;
mod field;
mod header;
mod message;
mod record;
mod schema;
mod update_rate;
mod wire_data;

// Re-export all public types
pub use basic_type::{BasicType, Time, Value};
pub use field::Field;
pub use header::MessageHeader;
pub use message::InboundMessage;
pub use record::{DecodedField, DecodedRecord};
pub use schema::{FlattenedField, FlattenedSchema, UnresolvedField};
pub use update_rate::UpdateRate;
pub use wire_data::WireData;
