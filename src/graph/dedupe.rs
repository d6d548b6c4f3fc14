//! Identity-key dedupe.
//!
//! Nodes sharing a graph key fold into the first one pushed. Merging is
//! additive: fields already present win, absent ones are filled, nested
//! objects merge recursively and arrays take the union. A node (existing or
//! incoming) marked `replace` makes the incoming node win wholesale.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::CollisionPolicy;
use crate::error::{GraphError, GraphResult};
use crate::identity::content_hash;
use crate::node::{is_empty_value, DedupeStrategy, GraphNode};

use super::index::{graph_key, GraphIndex};
use super::Graph;

/// Dedupe key of a node: the graph key of its id, or a content hash.
pub(crate) fn node_key(node: &GraphNode, hash_length: usize) -> String {
    match node.id() {
        Some(id) => graph_key(id).to_string(),
        None => content_hash(&node.to_map(), hash_length).unwrap_or_default(),
    }
}

/// Both nodes typed and no tag in common.
fn is_cross_type(a: &GraphNode, b: &GraphNode) -> bool {
    !a.types.is_empty() && !b.types.is_empty() && !a.types.iter().any(|t| b.has_type(t))
}

/// Folds `incoming` into `existing`; `existing` wins on conflict.
pub fn merge_nodes(existing: &mut GraphNode, incoming: GraphNode) {
    if existing.id.is_none() {
        existing.id = incoming.id;
    }
    for ty in incoming.types {
        if !existing.has_type(&ty) {
            existing.types.push(ty);
        }
    }
    if existing.resolver.is_none() {
        existing.resolver = incoming.resolver;
    }
    if existing.resolved_by.is_none() {
        existing.resolved_by = incoming.resolved_by;
    }
    for (key, value) in incoming.fields {
        match existing.fields.get_mut(&key) {
            Some(current) => merge_values(current, value),
            None => {
                existing.fields.insert(key, value);
            }
        }
    }
}

/// Deep-merges `incoming` into `current`; `current` wins on conflict.
pub fn merge_values(current: &mut Value, incoming: Value) {
    if is_empty_value(current) {
        *current = incoming;
        return;
    }
    match (current, incoming) {
        (Value::Object(cur), Value::Object(inc)) => {
            for (key, value) in inc {
                match cur.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        cur.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(cur), Value::Array(inc)) => {
            for item in inc {
                if !cur.contains(&item) {
                    cur.push(item);
                }
            }
        }
        _ => {}
    }
}

impl Graph {
    /// Folds nodes sharing a graph key, then rebuilds the index.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::IdentityCollision`] under [`CollisionPolicy::Reject`]
    /// when two differently-typed nodes share a key. The node list is left
    /// untouched in that case.
    pub(crate) fn dedupe_nodes(&mut self) -> GraphResult<()> {
        let hash_length = self.config.effective_hash_length();
        let policy = self.config.collision_policy;

        if policy == CollisionPolicy::Reject {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for (pos, node) in self.nodes.iter().enumerate() {
                let key = node_key(node, hash_length);
                if let Some(&first) = seen.get(&key) {
                    let existing = &self.nodes[first];
                    if is_cross_type(existing, node) {
                        return Err(GraphError::IdentityCollision {
                            key,
                            existing: existing.types.join(","),
                            incoming: node.types.join(","),
                        });
                    }
                } else {
                    seen.insert(key, pos);
                }
            }
        }

        let before = self.nodes.len();
        let mut deduped: Vec<GraphNode> = Vec::with_capacity(before);
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(before);
        for node in std::mem::take(&mut self.nodes) {
            let key = node_key(&node, hash_length);
            let Some(&pos) = positions.get(&key) else {
                positions.insert(key, deduped.len());
                deduped.push(node);
                continue;
            };
            let existing = &mut deduped[pos];
            if policy == CollisionPolicy::Warn && is_cross_type(existing, &node) {
                tracing::warn!(
                    key = %key,
                    existing = %existing.types.join(","),
                    incoming = %node.types.join(","),
                    "merging nodes of unrelated types sharing an identity"
                );
            }
            if existing.dedupe_strategy == DedupeStrategy::Replace
                || node.dedupe_strategy == DedupeStrategy::Replace
            {
                tracing::debug!(key = %key, "replacing node");
                *existing = node;
            } else {
                tracing::debug!(key = %key, "merging node");
                merge_nodes(existing, node);
            }
        }

        self.nodes = deduped;
        self.index = Some(GraphIndex::build(&self.nodes));
        tracing::debug!(before, after = self.nodes.len(), "deduped graph nodes");
        Ok(())
    }
}
