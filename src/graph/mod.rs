//! Graph ownership and the resolution pipeline.
//!
//! [`Graph`] is the single owner of every node (an arena addressed by
//! [`NodeIndex`]) and of the multi-key index. [`Graph::resolve_graph`] runs:
//!
//! 1. context resolution,
//! 2. pass 1: per-node pipeline and identity assignment, in push order,
//! 3. dedupe and index build,
//! 4. pass 2: generic root relations and `resolve_root_node` hooks,
//! 5. a second dedupe only when pass 2 pushed nodes,
//! 6. key-order normalization.
//!
//! Counters and the index are rebuilt on every call, so resolving the same
//! graph again yields the same output. Nodes resolved by an earlier call skip
//! the per-node pipeline but still run their root hook, so nodes pushed in
//! between get linked as if everything had been pushed at once.

mod dedupe;
mod index;
mod normalize;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::meta::{resolve_meta, MetaField, MetaInput, ResolvedMeta};
use crate::node::{id_reference, GraphNode};
use crate::relation::RelationOptions;
use crate::resolver::{ResolverDefinition, ResolverRegistry};
use crate::util::resolve_with_base;

pub use dedupe::{merge_nodes, merge_values};
pub use index::{domain_key, graph_key, GraphIndex, LookupKey};
pub use normalize::{normalize_node, normalize_nodes, render_document, SCHEMA_ORG_CONTEXT};

/// Resolver tag used to promote string `image` fields.
pub const IMAGE_RESOLVER_TAG: &str = "ImageObject";

/// Relation fields linking translations of the same work.
pub const TRANSLATION_FIELDS: [&str; 2] = ["translationOfWork", "workTranslation"];

/// Handle to a node in a [`Graph`]'s arena.
///
/// Valid until the next dedupe; hooks receive handles that stay valid for the
/// whole second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Arena position.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of nodes resolved together into one linked-data graph.
///
/// # Examples
///
/// ```
/// use schemaorg_graph::{Graph, GraphNode, MetaInput};
/// use serde_json::json;
///
/// let mut graph = Graph::new();
/// graph.push(GraphNode::tagged("Organization").with_field("name", "Acme"));
/// let nodes = graph.resolve_graph(MetaInput::for_host("https://example.com/")).unwrap();
/// assert_eq!(nodes[0]["@id"], json!("https://example.com/#identity"));
/// ```
#[derive(Debug)]
pub struct Graph {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) index: Option<GraphIndex>,
    pub(crate) id_counters: HashMap<String, u32>,
    pub(crate) meta: ResolvedMeta,
    pub(crate) registry: Arc<ResolverRegistry>,
    pub(crate) config: GraphConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a graph backed by the built-in resolver catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(ResolverRegistry::shared())
    }

    /// Creates a graph backed by a custom registry.
    #[must_use]
    pub fn with_registry(registry: Arc<ResolverRegistry>) -> Self {
        Self {
            nodes: Vec::new(),
            index: None,
            id_counters: HashMap::new(),
            meta: ResolvedMeta::default(),
            registry,
            config: GraphConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a node. Returns its arena handle.
    pub fn push(&mut self, node: GraphNode) -> NodeIndex {
        let pos = self.nodes.len();
        if let Some(index) = self.index.as_mut() {
            index.insert(pos, &node);
        }
        self.nodes.push(node);
        NodeIndex(pos)
    }

    /// Registers raw JSON: one object, or an array of objects.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if any element is not an object;
    /// nothing is pushed in that case.
    pub fn push_value(&mut self, value: Value) -> GraphResult<Vec<NodeIndex>> {
        let items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        let nodes = items
            .into_iter()
            .map(GraphNode::from_value)
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(nodes.into_iter().map(|n| self.push(n)).collect())
    }

    /// Registers nodes from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if `input` is not valid JSON, and
    /// the errors of [`Graph::push_value`] otherwise.
    pub fn push_json(&mut self, input: &str) -> GraphResult<Vec<NodeIndex>> {
        let value: Value = serde_json::from_str(input)?;
        self.push_value(value)
    }

    /// Number of nodes currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Reads a node by handle.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.nodes.get(idx.0)
    }

    /// Mutates a node by handle.
    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut GraphNode> {
        self.nodes.get_mut(idx.0)
    }

    /// Set-if-empty on another node. Returns true if the field was written.
    pub fn set_if_empty(&mut self, idx: NodeIndex, key: &str, value: Value) -> bool {
        self.node_mut(idx)
            .is_some_and(|node| node.set_if_empty(key, value))
    }

    /// Page context of the current (or last) resolution.
    #[must_use]
    pub fn meta(&self) -> &ResolvedMeta {
        &self.meta
    }

    /// Resolves and installs page context without resolving nodes.
    pub fn set_meta(&mut self, input: MetaInput) {
        self.meta = resolve_meta(input);
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Registry backing tag lookups.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    /// Looks up a resolver by tag.
    #[must_use]
    pub fn resolver(&self, tag: &str) -> Option<Arc<ResolverDefinition>> {
        self.registry.get(tag)
    }

    /// Finds a node handle.
    ///
    /// `#…` keys match graph keys, `/…` keys match domains, anything else
    /// matches full ids. Uses the index once built, a linear scan before.
    #[must_use]
    pub fn find_index(&self, key: &str) -> Option<NodeIndex> {
        let lookup = LookupKey::parse(key);
        let pos = match &self.index {
            Some(index) => index.lookup(lookup),
            None => index::scan(&self.nodes, lookup),
        };
        pos.map(NodeIndex)
    }

    /// Finds a node.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&GraphNode> {
        self.find_index(key).and_then(|idx| self.node(idx))
    }

    /// Finds a node for mutation.
    pub fn find_mut(&mut self, key: &str) -> Option<&mut GraphNode> {
        let idx = self.find_index(key)?;
        self.node_mut(idx)
    }

    /// Finds a node a hook cannot proceed without.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingNode`] if no node answers `key`.
    pub fn require(&self, key: &str) -> GraphResult<NodeIndex> {
        self.find_index(key)
            .ok_or_else(|| GraphError::missing_node(key))
    }

    /// Next value of a per-prefix counter. Counters reset on every resolution.
    pub fn next_counter(&mut self, prefix: &str) -> u32 {
        let counter = self.id_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Resolves every node into the final, deduplicated, key-ordered graph.
    ///
    /// # Errors
    ///
    /// Propagates errors from resolver functions and root hooks, and
    /// [`GraphError::IdentityCollision`] under the reject collision policy.
    #[tracing::instrument(skip_all, fields(nodes = self.nodes.len()))]
    pub fn resolve_graph(&mut self, meta: MetaInput) -> GraphResult<Vec<Value>> {
        self.meta = resolve_meta(meta);
        self.id_counters.clear();
        self.index = None;

        let pushed = self.nodes.len();
        for pos in 0..pushed {
            let node = std::mem::take(&mut self.nodes[pos]);
            let resolver = node
                .resolver
                .as_ref()
                .and_then(|r| self.registry.resolve_ref(r));
            let node = self.resolve_node(node, resolver.as_ref())?;
            self.nodes[pos] = self.resolve_node_id(node, resolver.as_ref(), true);
        }

        self.dedupe_nodes()?;

        let before_roots = self.nodes.len();
        for pos in 0..before_roots {
            let idx = NodeIndex(pos);
            self.resolve_root_relations(idx)?;
            let node = &self.nodes[pos];
            let hook = node
                .resolver
                .as_ref()
                .or(node.resolved_by.as_ref())
                .and_then(|r| self.registry.resolve_ref(r))
                .and_then(|def| def.resolve_root_node);
            if let Some(hook) = hook {
                hook(idx, self)?;
            }
        }
        for node in &mut self.nodes {
            if let Some(resolver) = node.resolver.take() {
                node.resolved_by = Some(resolver);
            }
        }

        let rededuped = self.nodes.len() != before_roots;
        if rededuped {
            self.dedupe_nodes()?;
        }
        tracing::debug!(
            pushed,
            resolved = self.nodes.len(),
            rededuped,
            "resolved graph"
        );

        Ok(normalize_nodes(&self.nodes))
    }

    /// Resolves the graph and wraps it into a linked-data document.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::resolve_graph`].
    pub fn to_document(&mut self, meta: MetaInput) -> GraphResult<Value> {
        Ok(render_document(self.resolve_graph(meta)?))
    }

    /// Relations every node type carries: string `image` fields are promoted
    /// to image nodes, translation links are canonicalized to references.
    fn resolve_root_relations(&mut self, idx: NodeIndex) -> GraphResult<()> {
        let pos = idx.0;
        if matches!(self.nodes[pos].get("image"), Some(Value::String(_))) {
            let image = self.nodes[pos].take("image");
            let resolver = self.resolver(IMAGE_RESOLVER_TAG);
            let resolved =
                self.resolve_relation(image, resolver.as_ref(), &RelationOptions::root())?;
            self.nodes[pos].set("image", resolved);
        }

        let host = self.meta.get_or_empty(MetaField::Host).to_string();
        for field in TRANSLATION_FIELDS {
            let value = self.nodes[pos].take(field);
            if value.is_null() {
                continue;
            }
            let as_reference = |v: Value| match v {
                Value::String(s) if s.starts_with('#') => id_reference(&s),
                Value::String(s) => id_reference(&resolve_with_base(&host, &s)),
                other => other,
            };
            let value = match value {
                Value::Array(items) => Value::Array(items.into_iter().map(as_reference).collect()),
                other => as_reference(other),
            };
            let resolved = self.resolve_relation(value, None, &RelationOptions::default())?;
            self.nodes[pos].set(field, resolved);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn meta() -> MetaInput {
        MetaInput::for_host("https://example.com/")
    }

    #[test]
    fn push_value_accepts_arrays() {
        let mut graph = Graph::new();
        let handles = graph
            .push_value(json!([{"name": "a"}, {"name": "b"}]))
            .unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn push_value_is_all_or_nothing() {
        let mut graph = Graph::new();
        let err = graph.push_value(json!([{"name": "a"}, 42])).unwrap_err();
        assert!(err.is_invalid_node());
        assert!(graph.is_empty());
    }

    #[test]
    fn push_json_parses_text() {
        let mut graph = Graph::new();
        let handles = graph
            .push_json(r#"[{"_resolver": "Person", "name": "a"}]"#)
            .unwrap();
        assert_eq!(handles.len(), 1);
        assert!(graph.push_json("{not json").unwrap_err().is_serialization());
        assert!(graph.push_json("[1]").unwrap_err().is_invalid_node());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn untagged_nodes_get_identity_and_dedupe() {
        let mut graph = Graph::new();
        graph.push_value(json!({"@type": "Thing", "name": "x"})).unwrap();
        graph.push_value(json!({"@type": "Thing", "name": "x"})).unwrap();
        let out = graph.resolve_graph(meta()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0]["@id"]
            .as_str()
            .unwrap()
            .starts_with("https://example.com/#/schema/thing/"));
    }

    #[test]
    fn unknown_tag_degrades_silently() {
        let mut graph = Graph::new();
        graph.push(GraphNode::tagged("NoSuchType").with_type("Custom").with_field("name", "n"));
        let out = graph.resolve_graph(meta()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["@type"], json!("Custom"));
    }

    #[test]
    fn find_uses_scan_before_index() {
        let mut graph = Graph::new();
        graph.push(GraphNode::new().with_id("https://example.com/#a"));
        assert!(graph.index.is_none());
        assert!(graph.find("#a").is_some());
        assert!(graph.require("#b").unwrap_err().is_missing_node());
    }

    #[test]
    fn push_after_index_build_is_findable() {
        let mut graph = Graph::new();
        graph.push(GraphNode::new().with_id("https://example.com/#a"));
        graph.resolve_graph(meta()).unwrap();
        assert!(graph.index.is_some());
        graph.push(GraphNode::new().with_id("https://example.com/#late"));
        assert!(graph.find("#late").is_some());
    }

    #[test]
    fn resolved_nodes_keep_their_hook_but_not_their_tag() {
        let mut graph = Graph::new();
        graph.push(GraphNode::tagged("Organization").with_field("name", "Acme"));
        graph.resolve_graph(meta()).unwrap();
        let org = &graph.nodes()[0];
        assert!(org.resolver.is_none());
        assert!(org.resolved_by.is_some());
    }

    #[test]
    fn counters_reset_per_resolution() {
        let mut graph = Graph::new();
        assert_eq!(graph.next_counter("x"), 1);
        assert_eq!(graph.next_counter("x"), 2);
        graph.resolve_graph(meta()).unwrap();
        assert_eq!(graph.next_counter("x"), 1);
    }

    #[test]
    fn string_image_is_promoted() {
        let mut graph = Graph::new();
        graph
            .push_value(json!({"@type": "Thing", "@id": "#thing", "image": "/a.png"}))
            .unwrap();
        let out = graph.resolve_graph(meta()).unwrap();
        assert_eq!(out.len(), 2);
        let image_id = out[0]["image"]["@id"].as_str().unwrap();
        assert!(image_id.starts_with("https://example.com/#/schema/image/"));
        let image = graph.find(image_id).unwrap();
        assert_eq!(image.get_str("url"), Some("https://example.com/a.png"));
    }

    #[test]
    fn translation_links_become_references() {
        let mut graph = Graph::new();
        graph
            .push_value(json!([
                {
                    "@type": "Thing",
                    "@id": "https://example.com/#en",
                    "workTranslation": ["#fr", "/fr/"],
                },
                {"@type": "Thing", "@id": "https://example.com/fr/#fr"},
            ]))
            .unwrap();
        let out = graph.resolve_graph(meta()).unwrap();
        assert_eq!(
            out[0]["workTranslation"],
            json!([{"@id": "https://example.com/fr/#fr"}, {"@id": "https://example.com/fr/"}])
        );
    }
}
