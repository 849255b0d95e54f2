//! Named composite type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Field;

/// Map from short composite type name (`Point`, `Header`) to its member
/// fields in declaration order.
///
/// Member order is decode order. The table is built once per definition text
/// and never modified by flattening or decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTable {
    types: HashMap<String, Vec<Field>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, returning the previous definition if the name was taken.
    pub fn insert(&mut self, name: impl Into<String>, fields: Vec<Field>) -> Option<Vec<Field>> {
        self.types.insert(name.into(), fields)
    }

    /// Member fields of a composite type (O(1) lookup).
    pub fn get(&self, name: &str) -> Option<&[Field]> {
        self.types.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted for stable output.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<(String, Vec<Field>)> for TypeTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Field>)>>(iter: I) -> Self {
        Self { types: iter.into_iter().collect() }
    }
}
