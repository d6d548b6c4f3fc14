//! Multi-key node index.
//!
//! Every node is reachable by three keys: its graph key (the fragment after
//! the last `#`), its full `@id`, and the domain of its `@id`. The first node
//! registering a key owns it.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::node::GraphNode;

static PROTOCOL_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

/// Graph key of an id: the substring after the last `#`, or the whole id.
///
/// ```
/// use schemaorg_graph::graph_key;
///
/// assert_eq!(graph_key("https://example.com/#identity"), "identity");
/// assert_eq!(graph_key("https://example.com/#/schema/person/1a2b"), "/schema/person/1a2b");
/// assert_eq!(graph_key("#webpage"), "webpage");
/// ```
#[must_use]
pub fn graph_key(id: &str) -> &str {
    match id.rfind('#') {
        Some(pos) => &id[pos + 1..],
        None => id,
    }
}

/// Domain key: protocol stripped, first path segment kept.
///
/// ```
/// use schemaorg_graph::domain_key;
///
/// assert_eq!(domain_key("https://example.com/#identity"), "example.com");
/// assert_eq!(domain_key("//example.com/about"), "example.com");
/// ```
#[must_use]
pub fn domain_key(input: &str) -> &str {
    let re = PROTOCOL_PREFIX_RE
        .get_or_init(|| Regex::new(r"^(?:https?:)?//").expect("static protocol prefix regex"));
    let stripped = match re.find(input) {
        Some(m) => &input[m.end()..],
        None => input,
    };
    stripped.split('/').next().unwrap_or_default()
}

/// Which index a lookup string addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey<'a> {
    /// `#…` keys, normalized to a graph key.
    Fragment(&'a str),
    /// `/…` keys, normalized to a domain.
    Domain(&'a str),
    /// Anything else, matched against full ids.
    Absolute(&'a str),
}

impl<'a> LookupKey<'a> {
    /// Classifies a lookup string.
    #[must_use]
    pub fn parse(key: &'a str) -> Self {
        if key.starts_with('#') {
            Self::Fragment(graph_key(key))
        } else if key.starts_with('/') {
            Self::Domain(domain_key(key))
        } else {
            Self::Absolute(key)
        }
    }

    /// Returns true if a node id answers this lookup.
    #[must_use]
    pub fn matches(&self, id: &str) -> bool {
        match *self {
            Self::Fragment(key) => graph_key(id) == key,
            Self::Domain(key) => domain_key(id) == key,
            Self::Absolute(key) => id == key,
        }
    }
}

/// Index over an arena of nodes, storing arena positions.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    fragments: HashMap<String, usize>,
    absolute: HashMap<String, usize>,
    domains: HashMap<String, usize>,
}

impl GraphIndex {
    /// Builds the index over the current arena.
    #[must_use]
    pub fn build(nodes: &[GraphNode]) -> Self {
        let mut index = Self::default();
        for (pos, node) in nodes.iter().enumerate() {
            index.insert(pos, node);
        }
        index
    }

    /// Registers a node's keys. Keys already owned by another node are kept.
    pub fn insert(&mut self, pos: usize, node: &GraphNode) {
        let Some(id) = node.id() else {
            return;
        };
        self.fragments.entry(graph_key(id).to_string()).or_insert(pos);
        self.absolute.entry(id.to_string()).or_insert(pos);
        let domain = domain_key(id);
        if !domain.is_empty() {
            self.domains.entry(domain.to_string()).or_insert(pos);
        }
    }

    /// Looks up a classified key.
    #[must_use]
    pub fn lookup(&self, key: LookupKey<'_>) -> Option<usize> {
        match key {
            LookupKey::Fragment(k) => self.fragments.get(k),
            LookupKey::Domain(k) => self.domains.get(k),
            LookupKey::Absolute(k) => self.absolute.get(k),
        }
        .copied()
    }

    /// Number of distinct fragment keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if no node is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Linear fallback used before the index exists.
#[must_use]
pub fn scan(nodes: &[GraphNode], key: LookupKey<'_>) -> Option<usize> {
    nodes
        .iter()
        .position(|n| n.id().is_some_and(|id| key.matches(id)))
}
