//! Graph configuration.

use serde::{Deserialize, Serialize};

/// Smallest number of hex characters kept from a content hash.
pub const MIN_HASH_LENGTH: usize = 4;

/// Largest number of hex characters a blake3 digest provides.
pub const MAX_HASH_LENGTH: usize = 64;

/// What to do when two nodes of unrelated types resolve to the same graph key.
///
/// Types are unrelated when both nodes declare `@type` and the two lists share
/// no tag. Nodes without a type never count as a collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Merge silently.
    Merge,
    /// Merge and emit a `tracing` warning.
    #[default]
    Warn,
    /// Fail the resolution with `GraphError::IdentityCollision`.
    Reject,
}

/// Per-graph configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Hex characters of the blake3 content hash used in derived ids.
    pub hash_length: usize,
    /// Cross-type identity collision handling.
    pub collision_policy: CollisionPolicy,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            hash_length: 8,
            collision_policy: CollisionPolicy::Warn,
        }
    }
}

impl GraphConfig {
    /// Hash length clamped to what a blake3 hex digest can supply.
    #[must_use]
    pub fn effective_hash_length(&self) -> usize {
        self.hash_length.clamp(MIN_HASH_LENGTH, MAX_HASH_LENGTH)
    }
}
