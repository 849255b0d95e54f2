//! Wire decoding trait and implementations for basic types

use super::{MessageHeader, Time};
use crate::{MsgscopeError, Result};

/// Trait for types that can be decoded from a little-endian message payload.
pub trait WireData: Sized {
    /// Decode this type from `data` starting at `offset`.
    ///
    /// Returns the value and the number of bytes consumed. Implementations must
    /// bounds-check every read and fail with [`MsgscopeError::OutOfBounds`]
    /// instead of reading past the end of `data`.
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)>;
}

/// Borrow `N` bytes at `offset` as a fixed-size array.
fn read_array<const N: usize>(data: &[u8], offset: usize, what: &str) -> Result<[u8; N]> {
    let bytes = offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            MsgscopeError::out_of_bounds(what, offset, N, data.len().saturating_sub(offset))
        })?;

    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok(array)
}

impl WireData for u8 {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let [byte] = read_array::<1>(data, offset, "uint8")?;
        Ok((byte, 1))
    }
}

impl WireData for u16 {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Ok((u16::from_le_bytes(read_array(data, offset, "uint16")?), 2))
    }
}

impl WireData for u32 {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Ok((u32::from_le_bytes(read_array(data, offset, "uint32")?), 4))
    }
}

impl WireData for u64 {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Ok((u64::from_le_bytes(read_array(data, offset, "uint64")?), 8))
    }
}

impl WireData for Time {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let bytes: [u8; 8] = read_array(data, offset, "time")?;
        let sec = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let nsec = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok((Time { sec, nsec }, 8))
    }
}

// Length-prefixed; the payload bytes are not validated as UTF-8.
impl WireData for String {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (len, prefix) =
            u32::from_wire(data, offset).map_err(|e| e.with_field("string length"))?;
        let len = len as usize;

        // offset + 4 cannot overflow: the prefix read above succeeded
        let start = offset + prefix;
        let bytes = start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| {
                MsgscopeError::out_of_bounds("string", start, len, data.len().saturating_sub(start))
            })?;

        Ok((String::from_utf8_lossy(bytes).into_owned(), prefix + len))
    }
}

/// `std_msgs/Header` laid out as uint32 seq, time stamp, string frame_id.
impl WireData for MessageHeader {
    fn from_wire(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (seq, seq_len) = u32::from_wire(data, offset)?;
        let (stamp, stamp_len) = Time::from_wire(data, offset + seq_len)?;
        let (frame_id, frame_len) = String::from_wire(data, offset + seq_len + stamp_len)?;
        Ok((MessageHeader { seq, stamp, frame_id }, seq_len + stamp_len + frame_len))
    }
}
