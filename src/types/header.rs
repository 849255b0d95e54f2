//! Standard message header

use serde::{Deserialize, Serialize};

use super::Time;

/// Decoded `std_msgs/Header`.
///
/// Most stamped messages start with this layout, so it gets a dedicated
/// decoder (see [`WireData`](super::WireData)) in addition to appearing as
/// `header.seq`, `header.stamp` and `header.frame_id` in flattened records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Consecutively increasing sequence id
    pub seq: u32,
    /// Acquisition time
    pub stamp: Time,
    /// Coordinate frame the data is associated with
    pub frame_id: String,
}

impl MessageHeader {
    /// Decode a header starting at `offset`.
    pub fn parse(data: &[u8], offset: usize) -> crate::Result<Self> {
        use super::WireData;
        Self::from_wire(data, offset).map(|(header, _)| header)
    }
}
