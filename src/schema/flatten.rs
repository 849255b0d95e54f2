//! Flattening of nested definitions into primitive dotted-path fields
//!
//! Composite fields are expanded depth-first in declaration order, so the
//! resulting field list is exactly the order in which a payload's bytes are
//! laid out. The expansion uses an explicit stack; each entry carries its
//! nesting depth so cyclic or absurdly deep definitions fail with
//! [`MsgscopeError::Recursion`]. Wide fan-out below the depth limit is capped
//! by [`MAX_EXPANDED_ENTRIES`] and fails with
//! [`MsgscopeError::ExpansionLimit`].
//!
//! Composite types missing from the type table are dropped from the output
//! and listed in [`FlattenedSchema::unresolved`]. This includes fields whose
//! type is a primitive outside the basic-type allowlist (`float64`, `int32`,
//! `bool`, ...): such fields never appear in decoded records.

use tracing::{trace, warn};

use super::TypeTable;
use crate::types::{Field, FlattenedField, FlattenedSchema, UnresolvedField};
use crate::{MsgscopeError, Result};

/// Default limit on composite nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Upper bound on the stack entries one definition may expand to.
///
/// Every entry counts, whether it ends up as a field, as an unresolved field
/// or as a composite that is expanded further.
pub const MAX_EXPANDED_ENTRIES: usize = 1 << 20;

/// Flatten root fields against a type table.
///
/// `max_depth` is the number of composite levels that may be expanded below
/// the root message.
pub fn flatten(
    root_fields: &[Field],
    type_table: &TypeTable,
    max_depth: usize,
) -> Result<FlattenedSchema> {
    flatten_bounded(root_fields, type_table, max_depth, MAX_EXPANDED_ENTRIES)
}

fn flatten_bounded(
    root_fields: &[Field],
    type_table: &TypeTable,
    max_depth: usize,
    max_entries: usize,
) -> Result<FlattenedSchema> {
    let mut fields = Vec::new();
    let mut unresolved = Vec::new();
    let mut expanded = 0usize;

    // Reverse pushes keep pops in declaration order.
    let mut stack: Vec<(Field, usize)> =
        root_fields.iter().rev().map(|field| (field.clone(), 0)).collect();

    while let Some((field, depth)) = stack.pop() {
        expanded += 1;
        if expanded > max_entries {
            return Err(MsgscopeError::expansion_limit(max_entries));
        }

        if let Some(basic_type) = field.basic_type() {
            trace!(path = %field.name, basic_type = %basic_type, "Flattened field");
            fields.push(FlattenedField::new(field.name, basic_type));
            continue;
        }

        let Some(members) = type_table.get(&field.type_name) else {
            warn!(
                path = %field.name,
                type_name = %field.type_name,
                "Dropping field with unsupported type"
            );
            unresolved.push(UnresolvedField { path: field.name, type_name: field.type_name });
            continue;
        };

        if depth >= max_depth {
            return Err(MsgscopeError::recursion(field.type_name, max_depth));
        }

        stack.extend(members.iter().rev().map(|member| (member.prefixed(&field.name), depth + 1)));
    }

    Ok(FlattenedSchema::new(fields, unresolved))
}
