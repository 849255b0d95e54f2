//! Basic (directly decodable) field types

use serde::{Deserialize, Serialize};

use super::WireData;

/// Primitive types a flattened field can have.
///
/// This is a fixed allowlist: any other type name in a definition is either a
/// composite resolved through the type table or an unsupported type that gets
/// dropped during flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    /// Two little-endian u32s: seconds then nanoseconds
    Time,
    /// Little-endian u32 length followed by that many raw bytes
    String,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
}

/// Definition type names accepted as basic types, in allowlist order.
const BASIC_TYPE_NAMES: [(&str, BasicType); 6] = [
    ("time", BasicType::Time),
    ("string", BasicType::String),
    ("uint8", BasicType::UInt8),
    ("uint16", BasicType::UInt16),
    ("uint32", BasicType::UInt32),
    ("uint64", BasicType::UInt64),
];

impl BasicType {
    /// Look up a definition type name in the basic-type allowlist.
    pub fn from_type_name(name: &str) -> Option<Self> {
        BASIC_TYPE_NAMES.iter().find(|(candidate, _)| *candidate == name).map(|(_, ty)| *ty)
    }

    /// Check whether a definition type name is a basic type.
    pub fn is_basic(name: &str) -> bool {
        Self::from_type_name(name).is_some()
    }

    /// Type name as written in message definitions.
    pub const fn type_name(&self) -> &'static str {
        match self {
            BasicType::Time => "time",
            BasicType::String => "string",
            BasicType::UInt8 => "uint8",
            BasicType::UInt16 => "uint16",
            BasicType::UInt32 => "uint32",
            BasicType::UInt64 => "uint64",
        }
    }

    /// Encoded width in bytes, or `None` for length-prefixed strings.
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            BasicType::UInt8 => Some(1),
            BasicType::UInt16 => Some(2),
            BasicType::UInt32 => Some(4),
            BasicType::UInt64 | BasicType::Time => Some(8),
            BasicType::String => None,
        }
    }

    /// Minimum number of bytes a value of this type occupies on the wire.
    pub const fn min_width(&self) -> usize {
        match self.fixed_width() {
            Some(width) => width,
            None => 4,
        }
    }
}

impl std::fmt::Display for BasicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// ROS `time`: seconds and nanoseconds since the epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Fractional seconds, for display and plotting.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 * 1e-9
    }
}

/// Runtime value of a decoded basic field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Time(Time),
    String(String),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
}

impl Value {
    /// Decode one value of `basic_type` at `offset`.
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn decode(basic_type: BasicType, data: &[u8], offset: usize) -> crate::Result<(Self, usize)> {
        Ok(match basic_type {
            BasicType::Time => {
                let (v, n) = Time::from_wire(data, offset)?;
                (Value::Time(v), n)
            }
            BasicType::String => {
                let (v, n) = String::from_wire(data, offset)?;
                (Value::String(v), n)
            }
            BasicType::UInt8 => {
                let (v, n) = u8::from_wire(data, offset)?;
                (Value::UInt8(v), n)
            }
            BasicType::UInt16 => {
                let (v, n) = u16::from_wire(data, offset)?;
                (Value::UInt16(v), n)
            }
            BasicType::UInt32 => {
                let (v, n) = u32::from_wire(data, offset)?;
                (Value::UInt32(v), n)
            }
            BasicType::UInt64 => {
                let (v, n) = u64::from_wire(data, offset)?;
                (Value::UInt64(v), n)
            }
        })
    }

    /// The basic type this value was decoded as.
    pub fn basic_type(&self) -> BasicType {
        match self {
            Value::Time(_) => BasicType::Time,
            Value::String(_) => BasicType::String,
            Value::UInt8(_) => BasicType::UInt8,
            Value::UInt16(_) => BasicType::UInt16,
            Value::UInt32(_) => BasicType::UInt32,
            Value::UInt64(_) => BasicType::UInt64,
        }
    }

    /// Widen any integer value to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt8(v) => Some(u64::from(*v)),
            Value::UInt16(v) => Some(u64::from(*v)),
            Value::UInt32(v) => Some(u64::from(*v)),
            Value::UInt64(v) => Some(*v),
            Value::Time(_) | Value::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<Time> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Time(t) => write!(f, "{}.{:09}", t.sec, t.nsec),
            Value::String(s) => f.write_str(s),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
        }
    }
}

