//! # Compilation Errors
//!
//! Error taxonomy shared by the component registry, graph validation, and
//! code generation. Every variant carries the identifiers the hosting UI
//! needs to highlight the offending element (node id, slot, field name).
//!
//! All errors are terminal for the current compile request: compilation is
//! all-or-nothing and never returns a partially generated script.

use thiserror::Error;

/// Errors surfaced by registry population, graph validation, configuration
/// checking, and code generation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A component id was registered twice.
    #[error("component '{id}' is already registered")]
    DuplicateComponent { id: String },

    /// A lookup named a component id the registry does not hold.
    #[error("unknown component '{id}'")]
    UnknownComponent { id: String },

    /// Two graph nodes share the same node id.
    #[error("node id '{node}' appears more than once in the graph")]
    DuplicateNode { node: String },

    /// A graph node references a descriptor id missing from the registry.
    #[error("node '{node}' references unknown descriptor '{descriptor}'")]
    UnknownDescriptor { node: String, descriptor: String },

    /// An edge references a missing node or an out-of-range slot.
    #[error("invalid edge {edge}")]
    InvalidEdge { edge: String },

    /// The graph contains a cycle passing through the named node.
    #[error("graph contains a cycle through node '{node}'")]
    Cycle { node: String },

    /// A required input slot has no incoming edge.
    #[error("node '{node}' has no edge into input slot {slot}")]
    MissingInput { node: String, slot: usize },

    /// Two edges feed the same input slot of the same node.
    #[error("node '{node}' input slot {slot} is bound by more than one edge")]
    DuplicateInputBinding { node: String, slot: usize },

    /// A visible form field holds a value that violates its declared type
    /// or option set. Hidden fields are exempt.
    #[error("node '{node}': invalid value for field '{field}': {reason}")]
    InvalidFieldValue {
        node: String,
        field: String,
        reason: String,
    },

    /// Two distinct component kinds emitted different bodies under the same
    /// helper-function name.
    #[error("helper '{name}' emitted with conflicting bodies by '{first}' and '{second}'")]
    HelperCollision {
        name: String,
        first: String,
        second: String,
    },

    /// A structurally valid configuration carried a value the component's
    /// contract cannot generate code for. This is a bug in the component
    /// kind, not a user error.
    #[error("node '{node}': unsupported value {value} for '{field}'")]
    UnsupportedConfigValue {
        node: String,
        field: String,
        value: String,
    },

    /// An emitted fragment read or wrote a variable outside its declared
    /// inputs and output.
    #[error("node '{node}' violated its emission contract: {detail}")]
    EmitContract { node: String, detail: String },

    /// A graph snapshot could not be deserialized.
    #[error("invalid graph snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl CompileError {
    /// Fill in the node id on errors raised below the graph layer.
    ///
    /// Form validation and `emit` run without knowledge of which graph node
    /// they are serving; the compiler attaches the node id afterwards.
    pub(crate) fn with_node(self, node_id: &str) -> Self {
        match self {
            CompileError::InvalidFieldValue { node, field, reason } if node.is_empty() => {
                CompileError::InvalidFieldValue {
                    node: node_id.to_string(),
                    field,
                    reason,
                }
            }
            CompileError::UnsupportedConfigValue { node, field, value } if node.is_empty() => {
                CompileError::UnsupportedConfigValue {
                    node: node_id.to_string(),
                    field,
                    value,
                }
            }
            CompileError::EmitContract { node, detail } if node.is_empty() => {
                CompileError::EmitContract {
                    node: node_id.to_string(),
                    detail,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let error = CompileError::MissingInput {
            node: "join_1".to_string(),
            slot: 1,
        };
        assert_eq!(
            error.to_string(),
            "node 'join_1' has no edge into input slot 1"
        );
    }

    #[test]
    fn test_helper_collision_message() {
        let error = CompileError::HelperCollision {
            name: "check_x".to_string(),
            first: "join".to_string(),
            second: "filter".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "helper 'check_x' emitted with conflicting bodies by 'join' and 'filter'"
        );
    }

    #[test]
    fn test_with_node_fills_empty_id_only() {
        let error = CompileError::InvalidFieldValue {
            node: String::new(),
            field: "how".to_string(),
            reason: "not an option".to_string(),
        };
        match error.with_node("join_1") {
            CompileError::InvalidFieldValue { node, .. } => assert_eq!(node, "join_1"),
            other => panic!("unexpected error: {other:?}"),
        }

        let error = CompileError::Cycle {
            node: "a".to_string(),
        };
        match error.with_node("b") {
            CompileError::Cycle { node } => assert_eq!(node, "a"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
