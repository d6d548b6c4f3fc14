//! Resolver contract.
//!
//! A [`ResolverDefinition`] is the fixed-shape behavior record for one entity
//! type. Nodes select their resolver by tag ([`ResolverRef`]); the
//! [`ResolverRegistry`] maps tags to definitions. Dispatch is a single map
//! lookup, never a trait object per node.

mod registry;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::{MetaField, ResolvedMeta};
use crate::node::{GraphNode, TYPE_KEY};

pub use registry::ResolverRegistry;

/// Type-specific normalization. May recurse into [`Graph::resolve_relation`].
pub type ResolveFn = fn(GraphNode, &mut Graph) -> GraphResult<GraphNode>;

/// Hook invoked once a node's identity is final and it belongs to the graph.
///
/// The hook receives the node's arena handle. It may `find()` other nodes and
/// mutate them, set-if-empty. Nodes it expects may be absent.
pub type RootHookFn = fn(NodeIndex, &mut Graph) -> GraphResult<()>;

/// Maps a bare primitive (string, number, bool) into canonical object shape.
pub type CastFn = fn(Value) -> Value;

/// Context-dependent defaults.
pub type DefaultsFn = fn(&ResolvedMeta) -> Map<String, Value>;

/// Defaults applied to a node before inheritance; node values always win.
#[derive(Debug, Clone, Default)]
pub enum Defaults {
    /// No defaults.
    #[default]
    None,
    /// Fixed field values.
    Static(Map<String, Value>),
    /// Computed from the page context.
    Dynamic(DefaultsFn),
}

impl Defaults {
    fn materialize(&self, meta: &ResolvedMeta) -> Option<Map<String, Value>> {
        match self {
            Self::None => None,
            Self::Static(map) => Some(map.clone()),
            Self::Dynamic(f) => Some(f(meta)),
        }
    }
}

/// Which context field prefixes derived ids, and the root alias for
/// singleton entities (`#identity`, `#webpage`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPrefix {
    /// Prefix with a context field.
    Field(MetaField),
    /// Prefix with a context field; a root node without `@id` takes `alias`.
    Root {
        /// Context field supplying the base URL.
        field: MetaField,
        /// Fragment assigned to the root instance.
        alias: String,
    },
}

impl Default for IdPrefix {
    fn default() -> Self {
        Self::Field(MetaField::Url)
    }
}

impl IdPrefix {
    /// Context field supplying the base URL.
    #[must_use]
    pub const fn field(&self) -> MetaField {
        match self {
            Self::Field(field) | Self::Root { field, .. } => *field,
        }
    }

    /// Root alias, if any.
    #[must_use]
    pub fn root_alias(&self) -> Option<&str> {
        match self {
            Self::Field(_) => None,
            Self::Root { alias, .. } => Some(alias),
        }
    }
}

/// Copies `meta` into node field `key` when the node lacks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritMeta {
    /// Context field read.
    pub meta: MetaField,
    /// Node field written.
    pub key: String,
}

impl From<MetaField> for InheritMeta {
    fn from(meta: MetaField) -> Self {
        Self {
            meta,
            key: meta.key().to_string(),
        }
    }
}

impl From<(MetaField, &str)> for InheritMeta {
    fn from((meta, key): (MetaField, &str)) -> Self {
        Self {
            meta,
            key: key.to_string(),
        }
    }
}

/// Behavior record for one entity type.
///
/// # Examples
///
/// ```
/// use schemaorg_graph::{IdPrefix, MetaField, ResolverDefinition};
///
/// let event = ResolverDefinition::new("Event")
///     .default_type("Event")
///     .inherit(MetaField::InLanguage)
///     .id_prefix(IdPrefix::Root { field: MetaField::Url, alias: "#event".into() });
/// assert_eq!(event.id_prefix.root_alias(), Some("#event"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolverDefinition {
    /// Tag the definition registers under.
    pub name: String,
    /// Field defaults.
    pub defaults: Defaults,
    /// Primitive-to-object cast.
    pub cast: Option<CastFn>,
    /// Context inheritance list, applied in order.
    pub inherit_meta: Vec<InheritMeta>,
    /// Type-specific normalization.
    pub resolve: Option<ResolveFn>,
    /// Cross-node hook run once the node is in the graph.
    pub resolve_root_node: Option<RootHookFn>,
    /// Id policy.
    pub id_prefix: IdPrefix,
    /// Replaces the kebab-cased type in hash-derived ids.
    pub alias: Option<String>,
}

impl ResolverDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Static defaults containing only `@type`.
    #[must_use]
    pub fn default_type(self, ty: &str) -> Self {
        let mut map = Map::new();
        map.insert(TYPE_KEY.to_string(), Value::String(ty.to_string()));
        self.defaults(Defaults::Static(map))
    }

    /// Sets the defaults.
    #[must_use]
    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets the cast.
    #[must_use]
    pub fn cast(mut self, cast: CastFn) -> Self {
        self.cast = Some(cast);
        self
    }

    /// Appends an inheritance entry.
    #[must_use]
    pub fn inherit(mut self, entry: impl Into<InheritMeta>) -> Self {
        self.inherit_meta.push(entry.into());
        self
    }

    /// Sets the resolve function.
    #[must_use]
    pub fn resolve(mut self, resolve: ResolveFn) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Sets the root hook.
    #[must_use]
    pub fn resolve_root_node(mut self, hook: RootHookFn) -> Self {
        self.resolve_root_node = Some(hook);
        self
    }

    /// Sets the id policy.
    #[must_use]
    pub fn id_prefix(mut self, id_prefix: IdPrefix) -> Self {
        self.id_prefix = id_prefix;
        self
    }

    /// Sets the id alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Fills absent node fields from the defaults.
    pub(crate) fn apply_defaults(&self, node: &mut GraphNode, meta: &ResolvedMeta) {
        let Some(defaults) = self.defaults.materialize(meta) else {
            return;
        };
        for (key, value) in defaults {
            node.set_if_empty(&key, value);
        }
    }

    /// Copies inherited context fields the node does not carry.
    pub(crate) fn apply_inherit_meta(&self, node: &mut GraphNode, meta: &ResolvedMeta) {
        for entry in &self.inherit_meta {
            if let Some(value) = meta.get(entry.meta) {
                node.set_if_empty(&entry.key, Value::String(value.to_string()));
            }
        }
    }
}

/// How a node names its resolver: a registry tag, or a definition directly.
#[derive(Debug, Clone)]
pub enum ResolverRef {
    /// Looked up in the registry at resolution time.
    Tag(String),
    /// Used as is.
    Definition(Arc<ResolverDefinition>),
}

impl From<&str> for ResolverRef {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl From<String> for ResolverRef {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl From<Arc<ResolverDefinition>> for ResolverRef {
    fn from(def: Arc<ResolverDefinition>) -> Self {
        Self::Definition(def)
    }
}

impl From<ResolverDefinition> for ResolverRef {
    fn from(def: ResolverDefinition) -> Self {
        Self::Definition(Arc::new(def))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::meta::{resolve_meta, MetaInput};

    fn page_defaults(meta: &ResolvedMeta) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("url".to_string(), json!(meta.url.clone().unwrap_or_default()));
        map
    }

    #[test]
    fn static_defaults_do_not_override() {
        let def = ResolverDefinition::new("Thing").default_type("Thing");
        let meta = ResolvedMeta::default();
        let mut node = GraphNode::new().with_type("Custom");
        def.apply_defaults(&mut node, &meta);
        assert_eq!(node.types, vec!["Custom"]);

        let mut bare = GraphNode::new();
        def.apply_defaults(&mut bare, &meta);
        assert_eq!(bare.types, vec!["Thing"]);
    }

    #[test]
    fn dynamic_defaults_read_context() {
        let def = ResolverDefinition::new("Page").defaults(Defaults::Dynamic(page_defaults));
        let meta = resolve_meta(MetaInput::for_host("https://example.com").path("/x"));
        let mut node = GraphNode::new();
        def.apply_defaults(&mut node, &meta);
        assert_eq!(node.get_str("url"), Some("https://example.com/x"));
    }

    #[test]
    fn inherit_meta_is_set_if_empty() {
        let def = ResolverDefinition::new("Article")
            .inherit(MetaField::InLanguage)
            .inherit((MetaField::Title, "headline"));
        let meta = resolve_meta(
            MetaInput::for_host("https://example.com")
                .in_language("en")
                .title("Page title"),
        );
        let mut node = GraphNode::new().with_field("headline", "Own headline");
        def.apply_inherit_meta(&mut node, &meta);
        assert_eq!(node.get_str("inLanguage"), Some("en"));
        assert_eq!(node.get_str("headline"), Some("Own headline"));
    }

    #[test]
    fn id_prefix_accessors() {
        assert_eq!(IdPrefix::default().field(), MetaField::Url);
        assert_eq!(IdPrefix::default().root_alias(), None);
        let root = IdPrefix::Root {
            field: MetaField::Host,
            alias: "#identity".to_string(),
        };
        assert_eq!(root.field(), MetaField::Host);
        assert_eq!(root.root_alias(), Some("#identity"));
    }
}
