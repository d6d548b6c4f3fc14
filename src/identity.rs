//! Identity assignment.
//!
//! Every node leaves the first resolution pass with an absolute `@id`. In
//! priority order the id is: kept (already absolute), the resolver's root
//! alias, a caller-supplied path or schema fragment (`/team`, `#/schema/…`)
//! prefixed with the context URL, or `#/schema/{alias}/{key}` where `key` is
//! the caller's literal id (`harlan`, `#partner`) or a blake3 hash of the
//! node's visible content.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::graph::Graph;
use crate::meta::MetaField;
use crate::node::GraphNode;
use crate::resolver::ResolverDefinition;
use crate::util::{has_protocol, prefix_id};

static CAMEL_BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
static ACRONYM_BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();

/// Kebab-cases a type name: `ImageObject` → `image-object`, `FAQPage` → `faq-page`.
#[must_use]
pub fn kebab_case(input: &str) -> String {
    let acronym = ACRONYM_BOUNDARY_RE
        .get_or_init(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static acronym regex"));
    let camel = CAMEL_BOUNDARY_RE
        .get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").expect("static camel regex"));
    let step = acronym.replace_all(input, "${1}-${2}");
    let step = camel.replace_all(&step, "${1}-${2}");
    step.replace(['_', ' '], "-").to_ascii_lowercase()
}

/// Rebuilds a value with object keys in sorted order, recursively.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Hex prefix of the blake3 hash of the canonical serialization of `fields`.
///
/// Internal (`_`-prefixed) keys are excluded. Returns `None` if serialization fails.
#[must_use]
pub fn content_hash(fields: &Map<String, Value>, length: usize) -> Option<String> {
    let visible: Map<String, Value> = fields
        .iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let bytes = serde_json::to_vec(&canonicalize(&Value::Object(visible))).ok()?;
    let hex = blake3::hash(&bytes).to_hex();
    Some(hex[..length.min(hex.len())].to_string())
}

impl Graph {
    /// Assigns a node's final `@id`.
    ///
    /// `as_root` is true when the node is resolved as a top-level graph member;
    /// only then may a resolver's root alias be used.
    pub fn resolve_node_id(
        &mut self,
        mut node: GraphNode,
        resolver: Option<&Arc<ResolverDefinition>>,
        as_root: bool,
    ) -> GraphNode {
        if node.id().is_some_and(has_protocol) {
            return node;
        }

        let field = resolver.map_or(MetaField::Url, |r| r.id_prefix.field());
        let base = self.meta.get_or_empty(field).to_string();

        if node.id.is_none() && as_root {
            if let Some(alias) = resolver.and_then(|r| r.id_prefix.root_alias()) {
                node.id = Some(prefix_id(&base, alias));
                return node;
            }
        }

        if let Some(id) = node.id() {
            if id.starts_with("#/schema/") || id.starts_with('/') {
                node.id = Some(prefix_id(&base, id));
                return node;
            }
        }

        let alias = resolver
            .and_then(|r| r.alias.clone())
            .unwrap_or_else(|| kebab_case(node.primary_type().unwrap_or_default()));
        let key = match node.id.take() {
            Some(literal) => literal,
            None => {
                let length = self.config.effective_hash_length();
                match content_hash(&node.to_map(), length) {
                    Some(hash) => hash,
                    None => {
                        let n = self.next_counter(&alias);
                        tracing::warn!(alias = %alias, n, "content hash failed, using counter id");
                        n.to_string()
                    }
                }
            }
        };
        node.id = Some(prefix_id(&base, &format!("#/schema/{alias}/{key}")));
        node
    }
}
