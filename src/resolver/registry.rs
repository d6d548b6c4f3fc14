use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::{ResolverDefinition, ResolverRef};

static BUILTIN: OnceLock<Arc<ResolverRegistry>> = OnceLock::new();

fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Tag → [`ResolverDefinition`] lookup table.
///
/// Populated once, then only read. Tags match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ResolverRegistry {
    by_tag: HashMap<String, Arc<ResolverDefinition>>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::catalog::register_builtin(&mut registry);
        registry
    }

    /// Process-wide shared instance of [`ResolverRegistry::builtin`].
    #[must_use]
    pub fn shared() -> Arc<Self> {
        BUILTIN.get_or_init(|| Arc::new(Self::builtin())).clone()
    }

    /// Registers a definition under its own name, replacing any previous one.
    pub fn register(&mut self, def: ResolverDefinition) -> Arc<ResolverDefinition> {
        let def = Arc::new(def);
        self.by_tag.insert(normalize_key(&def.name), def.clone());
        def
    }

    /// Registers an already-shared definition under an extra tag.
    pub fn register_alias(&mut self, tag: &str, def: &Arc<ResolverDefinition>) {
        self.by_tag.insert(normalize_key(tag), def.clone());
    }

    /// Looks up a tag. Unknown tags yield `None`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Arc<ResolverDefinition>> {
        let found = self.by_tag.get(&normalize_key(tag)).cloned();
        if found.is_none() {
            tracing::debug!(tag, "no resolver registered for tag");
        }
        found
    }

    /// Resolves a node's resolver reference.
    #[must_use]
    pub fn resolve_ref(&self, r: &ResolverRef) -> Option<Arc<ResolverDefinition>> {
        match r {
            ResolverRef::Tag(tag) => self.get(tag),
            ResolverRef::Definition(def) => Some(def.clone()),
        }
    }

    /// Returns true if the tag is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(&normalize_key(tag))
    }

    /// Number of registered tags, aliases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
