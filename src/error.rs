//! Error types for schemaorg-graph.
//!
//! Malformed domain data never produces an error: empty fields are stripped
//! and unknown resolver tags degrade silently. The variants below cover
//! logic-level failures (a hook requiring a node that is absent, a rejected
//! identity collision) and malformed raw input or JSON text.

use thiserror::Error;

/// Errors surfaced while building or resolving a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two nodes of unrelated types resolved to the same graph key and the
    /// configured collision policy rejects the merge.
    #[error("Identity collision on '{key}': [{existing}] vs incoming [{incoming}]")]
    IdentityCollision {
        /// Graph key both nodes resolved to.
        key: String,
        /// Comma-joined types of the node already in the graph.
        existing: String,
        /// Comma-joined types of the node being folded in.
        incoming: String,
    },

    /// A root hook required a node that `find()` could not locate.
    #[error("Node not found: {key}")]
    MissingNode {
        /// Lookup key that produced no node.
        key: String,
    },

    /// Raw input could not be turned into a node.
    #[error("Invalid node: {reason}")]
    InvalidNode {
        /// Why the input was refused.
        reason: String,
    },

    /// Raw JSON text could not be parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Creates a missing-node error for a lookup key.
    #[must_use]
    pub fn missing_node(key: impl Into<String>) -> Self {
        Self::MissingNode { key: key.into() }
    }

    /// Creates an invalid-node error.
    #[must_use]
    pub fn invalid_node(reason: impl Into<String>) -> Self {
        Self::InvalidNode {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a rejected identity collision.
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        matches!(self, Self::IdentityCollision { .. })
    }

    /// Returns true if a required node was absent.
    #[must_use]
    pub const fn is_missing_node(&self) -> bool {
        matches!(self, Self::MissingNode { .. })
    }

    /// Returns true if raw input was refused.
    #[must_use]
    pub const fn is_invalid_node(&self) -> bool {
        matches!(self, Self::InvalidNode { .. })
    }

    /// Returns true if raw JSON text failed to parse.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
