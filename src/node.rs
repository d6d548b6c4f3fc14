//! Graph node model.
//!
//! A [`GraphNode`] keeps the reserved keys (`@id`, `@type`, the resolver tag
//! and the dedupe strategy) in typed fields and every user-supplied key in an
//! ordered map. Raw JSON objects use `_resolver` and `_dedupeStrategy` for the
//! internal fields; they never reach serialized output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GraphError, GraphResult};
use crate::resolver::ResolverRef;

/// Reserved key holding a node's identity.
pub const ID_KEY: &str = "@id";
/// Reserved key holding a node's type tags.
pub const TYPE_KEY: &str = "@type";
/// Internal key tagging a raw object with its resolver.
pub const RESOLVER_KEY: &str = "_resolver";
/// Internal key carrying a raw object's dedupe strategy.
pub const DEDUPE_STRATEGY_KEY: &str = "_dedupeStrategy";

/// Conflict policy applied when another node resolves to the same graph key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeStrategy {
    /// Deep-merge; fields already present win.
    #[default]
    Merge,
    /// The later node replaces the earlier one wholesale.
    Replace,
}

impl DedupeStrategy {
    fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("replace") {
            Self::Replace
        } else {
            Self::Merge
        }
    }
}

/// One entity in the graph.
#[derive(Debug, Clone, Default)]
pub struct GraphNode {
    /// `@id`; absent until identity assignment.
    pub id: Option<String>,
    /// `@type` tags in display order.
    pub types: Vec<String>,
    /// Resolver governing this node. Moved to `resolved_by` once the node is
    /// fully resolved.
    pub resolver: Option<ResolverRef>,
    /// Resolver an earlier resolution ran. Only its root hook runs again on
    /// later resolutions. Never serialized.
    pub resolved_by: Option<ResolverRef>,
    /// Collision policy during dedupe.
    pub dedupe_strategy: DedupeStrategy,
    /// User fields in registration order.
    pub fields: Map<String, Value>,
}

impl GraphNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node tagged with a resolver.
    #[must_use]
    pub fn tagged(resolver: impl Into<ResolverRef>) -> Self {
        Self {
            resolver: Some(resolver.into()),
            ..Self::default()
        }
    }

    /// Sets the resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl Into<ResolverRef>) -> Self {
        self.resolver = Some(resolver.into());
        self
    }

    /// Sets `@id`.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends a `@type` tag.
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Sets a field, routing reserved keys to their typed slots.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    /// Sets the dedupe strategy.
    #[must_use]
    pub fn with_dedupe_strategy(mut self, strategy: DedupeStrategy) -> Self {
        self.dedupe_strategy = strategy;
        self
    }

    /// Builds a node from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `value` is not an object.
    pub fn from_value(value: Value) -> GraphResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(GraphError::invalid_node(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builds a node from a raw JSON object, lifting reserved and internal keys.
    ///
    /// Unrecognized `_`-prefixed keys are internal by convention and dropped.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut node = Self::default();
        for (key, value) in map {
            match key.as_str() {
                RESOLVER_KEY => {
                    if let Value::String(tag) = value {
                        node.resolver = Some(ResolverRef::Tag(tag));
                    }
                }
                DEDUPE_STRATEGY_KEY => {
                    if let Value::String(s) = value {
                        node.dedupe_strategy = DedupeStrategy::parse(&s);
                    }
                }
                k if k.starts_with('_') => {}
                _ => node.set(key, value),
            }
        }
        node
    }

    /// Reads `@id`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// First `@type` tag.
    #[must_use]
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// Returns true if the node carries the given `@type` tag.
    #[must_use]
    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }

    /// Sets `@type` to `ty` when the node has no type yet.
    pub fn set_default_type(&mut self, ty: &str) {
        if self.types.is_empty() {
            self.types.push(ty.to_string());
        }
    }

    /// Reads a user field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Reads a user field as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns true if the field is present and non-empty.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        match key {
            ID_KEY => self.id.as_deref().is_some_and(|id| !id.is_empty()),
            TYPE_KEY => !self.types.is_empty(),
            _ => self.fields.get(key).is_some_and(|v| !is_empty_value(v)),
        }
    }

    /// Sets a field. `@id` and `@type` go to their typed slots; a null value
    /// removes the field.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            ID_KEY => self.id = value.as_str().map(str::to_string),
            TYPE_KEY => self.types = types_from_value(&value),
            _ => {
                if value.is_null() {
                    self.fields.shift_remove(&key);
                } else {
                    self.fields.insert(key, value);
                }
            }
        }
    }

    /// Removes and returns a user field, or `Value::Null` if absent.
    pub fn take(&mut self, key: &str) -> Value {
        self.fields.shift_remove(key).unwrap_or(Value::Null)
    }

    /// Assigns `value` only when the field is absent or empty.
    ///
    /// Empty values are never written. Returns true if the field was set.
    pub fn set_if_empty(&mut self, key: &str, value: Value) -> bool {
        if is_empty_value(&value) || self.has(key) {
            return false;
        }
        self.set(key, value);
        true
    }

    /// Visible (serializable) view: `@id`, `@type`, then user fields.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut out = Map::with_capacity(self.fields.len() + 2);
        if let Some(id) = &self.id {
            out.insert(ID_KEY.to_string(), Value::String(id.clone()));
        }
        if let Some(types) = types_to_value(&self.types) {
            out.insert(TYPE_KEY.to_string(), types);
        }
        for (k, v) in &self.fields {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Consumes the node into its visible JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 2);
        if let Some(id) = self.id {
            out.insert(ID_KEY.to_string(), Value::String(id));
        }
        if let Some(types) = types_to_value(&self.types) {
            out.insert(TYPE_KEY.to_string(), types);
        }
        out.extend(self.fields);
        Value::Object(out)
    }

    /// Removes empty strings and nulls from every field, recursively.
    pub fn strip_empty(&mut self) {
        strip_empty_properties(&mut self.fields);
        if self.id.as_deref().is_some_and(str::is_empty) {
            self.id = None;
        }
        self.types.retain(|t| !t.is_empty());
    }
}

/// Bare reference `{"@id": id}` to another node.
#[must_use]
pub fn id_reference(id: &str) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    Value::Object(map)
}

/// Returns the `@id` of a bare id-reference: an object whose only keys are
/// `@id`, or `@id` and `@type`.
#[must_use]
pub fn as_id_reference(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    let id = map.get(ID_KEY)?.as_str()?;
    match map.len() {
        1 => Some(id),
        2 if map.contains_key(TYPE_KEY) => Some(id),
        _ => None,
    }
}

/// Null and the empty string count as absent.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Recursively drops null and empty-string entries from objects and arrays.
pub fn strip_empty_properties(map: &mut Map<String, Value>) {
    map.retain(|_, v| !is_empty_value(v));
    for value in map.values_mut() {
        strip_empty_value(value);
    }
}

fn strip_empty_value(value: &mut Value) {
    match value {
        Value::Object(map) => strip_empty_properties(map),
        Value::Array(items) => {
            items.retain(|v| !is_empty_value(v));
            for item in items {
                strip_empty_value(item);
            }
        }
        _ => {}
    }
}

fn types_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn types_to_value(types: &[String]) -> Option<Value> {
    match types {
        [] => None,
        [single] => Some(Value::String(single.clone())),
        many => Some(Value::Array(
            many.iter().cloned().map(Value::String).collect(),
        )),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_lifts_reserved_keys() {
        let node = GraphNode::from_value(json!({
            "@id": "#identity",
            "@type": ["Organization", "Corporation"],
            "_resolver": "Organization",
            "_dedupeStrategy": "replace",
            "_private": true,
            "name": "Acme",
        }))
        .unwrap();
        assert_eq!(node.id(), Some("#identity"));
        assert_eq!(node.types, vec!["Organization", "Corporation"]);
        assert!(matches!(node.resolver, Some(ResolverRef::Tag(ref t)) if t == "Organization"));
        assert_eq!(node.dedupe_strategy, DedupeStrategy::Replace);
        assert_eq!(node.fields.len(), 1);
        assert_eq!(node.get_str("name"), Some("Acme"));
    }

    #[test]
    fn from_value_rejects_non_objects() {
        let err = GraphNode::from_value(json!("Harlan")).unwrap_err();
        assert!(err.is_invalid_node());
    }

    #[test]
    fn set_if_empty_never_overwrites() {
        let mut node = GraphNode::new().with_field("name", "first");
        assert!(!node.set_if_empty("name", json!("second")));
        assert_eq!(node.get_str("name"), Some("first"));
        assert!(node.set_if_empty("headline", json!("h")));
        assert!(!node.set_if_empty("empty", json!("")));
        assert!(!node.set_if_empty("null", Value::Null));
        assert!(node.get("empty").is_none());
    }

    #[test]
    fn set_if_empty_replaces_empty_string() {
        let mut node = GraphNode::new().with_field("name", "");
        assert!(node.set_if_empty("name", json!("filled")));
        assert_eq!(node.get_str("name"), Some("filled"));
    }

    #[test]
    fn single_type_serializes_as_string() {
        let value = GraphNode::new().with_type("Person").with_id("#me").into_value();
        assert_eq!(value, json!({"@id": "#me", "@type": "Person"}));
    }

    #[test]
    fn id_reference_detection() {
        assert_eq!(as_id_reference(&json!({"@id": "#a"})), Some("#a"));
        assert_eq!(as_id_reference(&json!({"@id": "#a", "@type": "Person"})), Some("#a"));
        assert_eq!(as_id_reference(&json!({"@id": "#a", "name": "x"})), None);
        assert_eq!(as_id_reference(&json!({"name": "x"})), None);
        assert_eq!(as_id_reference(&json!("#a")), None);
    }

    #[test]
    fn strip_empty_is_recursive() {
        let mut node = GraphNode::from_value(json!({
            "name": "",
            "nested": {"a": null, "b": "keep", "c": {"d": ""}},
            "list": ["", "x", null, {"e": ""}],
        }))
        .unwrap();
        node.strip_empty();
        assert_eq!(
            node.into_value(),
            json!({"nested": {"b": "keep", "c": {}}, "list": ["x", {}]})
        );
    }

    #[test]
    fn setting_null_removes_field() {
        let mut node = GraphNode::new().with_field("a", 1);
        node.set("a", Value::Null);
        assert!(node.get("a").is_none());
    }
}
