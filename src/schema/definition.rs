//! Message definition text parsing
//!
//! # Definition Format
//!
//! A definition is the root message's field list followed by zero or more
//! nested type definitions, separated by lines of `=`:
//!
//! ```text
//! Header header
//! uint32 count
//! ================================================================================
//! MSG: std_msgs/Header
//! uint32 seq
//! time stamp
//! string frame_id
//! ```
//!
//! Every field line is exactly two space-separated tokens, `<type> <name>`.
//! A `MSG: <namespace>/<Type>` line names the block it appears in; the
//! namespace is discarded. Lines with any other token count (comments with
//! several words, blank lines) are skipped.
//!
//! # Permissiveness
//!
//! Parsing never fails. Skipped lines and nested blocks without a `MSG:`
//! name are reported on [`MessageDefinition`] and logged, but do not stop the
//! rest of the definition from being used.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::TypeTable;
use crate::text_utils::{short_type_name, split};
use crate::types::Field;

const BLOCK_SEPARATOR: char = '=';
const TYPE_NAME_MARKER: &str = "MSG:";

/// A definition line that was not a two-token declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// Index of the block the line appeared in (0 = root)
    pub block: usize,
    /// The line as written
    pub line: String,
}

/// Parsed form of a message definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    /// Fields of the root message in declaration order
    pub root_fields: Vec<Field>,
    /// Nested type definitions keyed by short type name
    pub type_table: TypeTable,
    /// Lines ignored because they were not `<type> <name>` declarations
    pub skipped_lines: Vec<SkippedLine>,
    /// Nested blocks with field lines but no `MSG:` name
    pub discarded_blocks: usize,
}

impl MessageDefinition {
    /// Parse definition text. See the module docs for the format.
    pub fn parse(text: &str) -> Self {
        let mut definition = MessageDefinition::default();

        for (block_index, block) in split(text, BLOCK_SEPARATOR).iter().enumerate() {
            let mut type_name = String::new();
            let mut fields = Vec::new();

            for line in split(block, '\n') {
                let tokens = split(&line, ' ');
                let [first, second] = tokens.as_slice() else {
                    trace!(block = block_index, line = %line, "Skipping non-declaration line");
                    definition.skipped_lines.push(SkippedLine { block: block_index, line });
                    continue;
                };

                if first == TYPE_NAME_MARKER {
                    type_name = short_type_name(second).to_string();
                    continue;
                }

                let field = Field::new(second.as_str(), first.as_str());
                if block_index == 0 {
                    definition.root_fields.push(field);
                } else {
                    fields.push(field);
                }
            }

            if block_index == 0 {
                continue;
            }

            if type_name.is_empty() {
                if !fields.is_empty() {
                    warn!(
                        block = block_index,
                        field_count = fields.len(),
                        "Discarding nested definition block without a MSG: type name"
                    );
                    definition.discarded_blocks += 1;
                }
                continue;
            }

            debug!(type_name = %type_name, field_count = fields.len(), "Registered nested type");
            if definition.type_table.insert(type_name.clone(), fields).is_some() {
                warn!(type_name = %type_name, "Duplicate nested type definition, keeping the last one");
            }
        }

        if !definition.skipped_lines.is_empty() {
            debug!(count = definition.skipped_lines.len(), "Skipped non-declaration lines");
        }

        definition
    }
}

/// Parse definition text into a root field list and type table.
pub fn parse_definition(text: &str) -> MessageDefinition {
    MessageDefinition::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSE_STAMPED: &str = "\
# A Pose with reference coordinate frame and timestamp
Header header
Pose pose

================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id

================================================================================
MSG: geometry_msgs/Pose
Point position
Quaternion orientation
";

    #[test]
    fn single_root_block() {
        let definition = parse_definition("uint32 seq\nstring frame_id");
        assert_eq!(
            definition.root_fields,
            vec![Field::new("seq", "uint32"), Field::new("frame_id", "string")]
        );
        assert!(definition.type_table.is_empty());
        assert!(definition.skipped_lines.is_empty());
    }

    #[test]
    fn nested_blocks_register_short_type_names() {
        let definition = parse_definition(POSE_STAMPED);

        assert_eq!(
            definition.root_fields,
            vec![Field::new("header", "Header"), Field::new("pose", "Pose")]
        );
        assert_eq!(definition.type_table.type_names(), ["Header", "Pose"]);
        assert_eq!(
            definition.type_table.get("Header").unwrap(),
            [
                Field::new("seq", "uint32"),
                Field::new("stamp", "time"),
                Field::new("frame_id", "string"),
            ]
        );
    }

    #[test]
    fn comment_lines_with_many_tokens_are_skipped() {
        let definition = parse_definition(POSE_STAMPED);
        assert_eq!(definition.skipped_lines.len(), 1);
        assert_eq!(definition.skipped_lines[0].block, 0);
        assert!(definition.skipped_lines[0].line.starts_with("# A Pose"));
    }

    #[test]
    fn block_without_msg_line_is_discarded() {
        let definition = parse_definition("uint8 a\n=====\nuint8 orphan\n=====\nMSG: pkg/Kept\nuint8 b");
        assert_eq!(definition.discarded_blocks, 1);
        assert_eq!(definition.type_table.type_names(), ["Kept"]);
    }

    #[test]
    fn msg_line_in_root_block_does_not_create_a_type() {
        let definition = parse_definition("MSG: pkg/Root\nuint8 a");
        assert_eq!(definition.root_fields, vec![Field::new("a", "uint8")]);
        assert!(definition.type_table.is_empty());
    }

    #[test]
    fn msg_line_without_namespace_uses_whole_name() {
        let definition = parse_definition("Thing t\n===\nMSG: Thing\nuint8 x");
        assert!(definition.type_table.contains("Thing"));
    }

    #[test]
    fn later_duplicate_type_replaces_earlier() {
        let definition =
            parse_definition("A a\n===\nMSG: p/A\nuint8 first\n===\nMSG: q/A\nuint16 second");
        assert_eq!(definition.type_table.get("A").unwrap(), [Field::new("second", "uint16")]);
    }

    #[test]
    fn empty_definition_parses_to_nothing() {
        let definition = parse_definition("");
        assert!(definition.root_fields.is_empty());
        assert!(definition.type_table.is_empty());
    }

    #[test]
    fn type_precedes_name() {
        let definition = parse_definition("string label");
        assert_eq!(definition.root_fields[0].type_name, "string");
        assert_eq!(definition.root_fields[0].name, "label");
    }
}
