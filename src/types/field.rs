//! Field declarations as written in message definitions

use serde::{Deserialize, Serialize};

use super::BasicType;

/// A `<type> <name>` declaration from a message definition.
///
/// Before flattening `name` is the bare identifier; flattening produces new
/// fields whose names are dotted paths such as `pose.position.x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field identifier or dotted path
    pub name: String,
    /// Basic type name or composite type name
    pub type_name: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into() }
    }

    /// Copy of this field with its name placed under `prefix`.
    ///
    /// An empty prefix leaves the name unchanged.
    pub fn prefixed(&self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self.clone();
        }
        Self { name: format!("{}.{}", prefix, self.name), type_name: self.type_name.clone() }
    }

    /// The basic type of this field, if its type is on the allowlist.
    pub fn basic_type(&self) -> Option<BasicType> {
        BasicType::from_type_name(&self.type_name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.type_name)
    }
}
