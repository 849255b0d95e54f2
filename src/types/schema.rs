//! Flattened schema types

use serde::{Deserialize, Serialize};

use super::BasicType;

/// One primitive field of a flattened schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlattenedField {
    /// Dotted path from the root message (e.g. `header.stamp`)
    pub path: String,
    /// Wire type of the field
    pub basic_type: BasicType,
}

impl FlattenedField {
    pub fn new(path: impl Into<String>, basic_type: BasicType) -> Self {
        Self { path: path.into(), basic_type }
    }
}

/// A composite field dropped during flattening because its type was not
/// defined in the message definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedField {
    /// Dotted path the field would have had
    pub path: String,
    /// The type name that could not be resolved
    pub type_name: String,
}

/// Depth-first expansion of a message definition into primitive fields.
///
/// Field order is the byte order of every payload matching the definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedSchema {
    /// Primitive fields in decode order
    pub fields: Vec<FlattenedField>,
    /// Fields dropped because their type was unknown, in encounter order
    pub unresolved: Vec<UnresolvedField>,
}

impl FlattenedSchema {
    pub fn new(fields: Vec<FlattenedField>, unresolved: Vec<UnresolvedField>) -> Self {
        Self { fields, unresolved }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlattenedField> {
        self.fields.iter()
    }

    /// Field paths in decode order.
    pub fn paths(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.path.as_str()).collect()
    }

    /// Find a field by its dotted path.
    pub fn get_field(&self, path: &str) -> Option<&FlattenedField> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Total payload size if every field has a fixed width.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.basic_type.fixed_width()).sum()
    }

    /// Smallest payload that could possibly match this schema.
    pub fn min_size(&self) -> usize {
        self.fields.iter().map(|f| f.basic_type.min_width()).sum()
    }

    /// Whether any field was dropped as unresolved.
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }
}
