//! Inbound message envelope for the stream-based architecture

use std::sync::Arc;

/// One message as delivered by the transport.
///
/// This is the fundamental data unit handed to a channel. The definition text
/// accompanies every message; only the first one that reaches a channel is
/// parsed.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Fully qualified message type (e.g. `geometry_msgs/PoseStamped`)
    pub datatype: String,

    /// Definition checksum as advertised by the publisher
    pub md5sum: String,

    /// Full message definition text, nested types included
    pub definition: Arc<str>,

    /// Serialized payload (zero-copy via Arc)
    pub payload: Arc<[u8]>,
}

impl InboundMessage {
    /// Create a new message
    pub fn new(
        datatype: impl Into<String>,
        md5sum: impl Into<String>,
        definition: impl Into<Arc<str>>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            datatype: datatype.into(),
            md5sum: md5sum.into(),
            definition: definition.into(),
            payload: payload.into(),
        }
    }

    /// Message carrying only a definition and payload.
    ///
    /// Useful for transports that do not advertise a type name or checksum.
    pub fn untyped(definition: impl Into<Arc<str>>, payload: Vec<u8>) -> Self {
        Self::new("", "", definition, payload)
    }

    /// Reuse this message's definition for a new payload.
    pub fn with_payload(&self, payload: Vec<u8>) -> Self {
        Self {
            datatype: self.datatype.clone(),
            md5sum: self.md5sum.clone(),
            definition: Arc::clone(&self.definition),
            payload: payload.into(),
        }
    }
}
