//! Test utilities for building payloads and message fixtures
//!
//! This module provides a little-endian payload encoder and a couple of
//! representative message definitions that are used across unit tests and
//! benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::InboundMessage;

/// `std_msgs/Header` wrapped as the single field of a root message.
pub const HEADER_DEFINITION: &str = "\
Header header

================================================================================
MSG: std_msgs/Header
# Standard metadata for higher-level stamped data types.
uint32 seq
time stamp
string frame_id
";

/// A stamped battery report exercising every basic type.
pub const BATTERY_DEFINITION: &str = "\
Header header
uint8 status
uint16 cell_count
uint32 charge_mah
uint64 uptime_ns
string serial_number
Health health

================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id

================================================================================
MSG: power_msgs/Health
uint8 level
time last_check
";

/// Checksum advertised with [`BATTERY_DEFINITION`] fixtures.
pub const BATTERY_MD5: &str = "5d1a2c7e0f3b4a8e9c6d2b1a0f9e8d7c";

/// Little-endian payload encoder matching the wire layout the decoder reads.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    data: Vec<u8>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.data.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn time(self, sec: u32, nsec: u32) -> Self {
        self.u32(sec).u32(nsec)
    }

    pub fn string(self, value: &str) -> Self {
        let mut builder = self.u32(value.len() as u32);
        builder.data.extend_from_slice(value.as_bytes());
        builder
    }

    /// Append raw bytes, e.g. to build deliberately malformed payloads.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Payload for [`BATTERY_DEFINITION`] with the given header sequence number.
pub fn battery_payload(seq: u32) -> Vec<u8> {
    PayloadBuilder::new()
        .u32(seq)
        .time(1_700_000_000 + seq, 500_000_000)
        .string("battery_link")
        .u8(2)
        .u16(6)
        .u32(4_200 - seq)
        .u64(u64::from(seq) * 1_000_000_000)
        .string("BAT-0042")
        .u8(1)
        .time(1_700_000_000, 0)
        .build()
}

/// Inbound battery message carrying its full definition.
pub fn battery_message(seq: u32) -> InboundMessage {
    InboundMessage::new(
        "power_msgs/BatteryReport",
        BATTERY_MD5,
        BATTERY_DEFINITION,
        battery_payload(seq),
    )
}
