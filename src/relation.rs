//! Relation resolution.
//!
//! A relation field holds one or many related entities. Each element is, in
//! order of precedence:
//!
//! - a bare id-reference (`{"@id"}` or `{"@id", "@type"}`), canonicalized
//!   through the index and otherwise passed through;
//! - an object tagged with its own `_resolver`, which overrides the fallback;
//! - a primitive, cast to an object by the fallback resolver;
//! - anything else without a resolver, passed through untouched.
//!
//! Elements with a resolver run the full node pipeline. With root promotion
//! they also get an identity, are pushed into the graph, have their root hook
//! invoked, and are replaced by a reference.

use std::sync::Arc;

use serde_json::Value;

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::meta::ResolvedMeta;
use crate::node::{as_id_reference, id_reference, is_empty_value, GraphNode, RESOLVER_KEY};
use crate::resolver::{ResolverDefinition, ResolverRef};

/// Callback run on a relation element right after its resolver.
pub type AfterResolveFn<'a> = &'a dyn Fn(&mut GraphNode, &ResolvedMeta);

/// Options for [`Graph::resolve_relation`].
#[derive(Clone, Copy, Default)]
pub struct RelationOptions<'a> {
    /// Always return an array, even for a single element.
    pub array: bool,
    /// Promote resolved elements to top-level graph nodes.
    pub root: bool,
    /// Assign identities to resolved elements without promoting them.
    pub generate_id: bool,
    /// Runs after the element's resolver, before identity assignment.
    pub after_resolve: Option<AfterResolveFn<'a>>,
}

impl<'a> RelationOptions<'a> {
    /// Root promotion.
    #[must_use]
    pub fn root() -> Self {
        Self {
            root: true,
            ..Self::default()
        }
    }

    /// Array form.
    #[must_use]
    pub fn array() -> Self {
        Self {
            array: true,
            ..Self::default()
        }
    }

    /// Identity assignment without promotion.
    #[must_use]
    pub fn generate_id() -> Self {
        Self {
            generate_id: true,
            ..Self::default()
        }
    }

    /// Sets the after-resolve callback.
    #[must_use]
    pub fn after_resolve(mut self, f: AfterResolveFn<'a>) -> Self {
        self.after_resolve = Some(f);
        self
    }
}

fn is_tagged(value: &Value) -> bool {
    value.as_object().is_some_and(|m| m.contains_key(RESOLVER_KEY))
}

fn holds_tagged(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(is_tagged),
        other => is_tagged(other),
    }
}

impl Graph {
    /// Runs the per-node pipeline: defaults, inherited context, type-specific
    /// resolve, then `_resolver`-tagged objects held directly in a field or
    /// inside an array field. Empty fields are stripped afterwards.
    ///
    /// # Errors
    ///
    /// Propagates errors from resolve functions and nested root hooks.
    pub fn resolve_node(
        &mut self,
        mut node: GraphNode,
        resolver: Option<&Arc<ResolverDefinition>>,
    ) -> GraphResult<GraphNode> {
        if let Some(def) = resolver {
            def.apply_defaults(&mut node, &self.meta);
            def.apply_inherit_meta(&mut node, &self.meta);
            if let Some(resolve) = def.resolve {
                node = resolve(node, self)?;
            }
        }

        let tagged: Vec<String> = node
            .fields
            .iter()
            .filter(|(_, v)| holds_tagged(v))
            .map(|(k, _)| k.clone())
            .collect();
        let options = RelationOptions::default();
        for key in tagged {
            let Some(value) = node.fields.get_mut(&key).map(Value::take) else {
                continue;
            };
            let resolved = match value {
                // Untagged siblings are kept as written.
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(if is_tagged(&item) {
                            self.resolve_relation_element(item, None, &options)?
                        } else {
                            item
                        });
                    }
                    Value::Array(out)
                }
                other => self.resolve_relation(other, None, &options)?,
            };
            node.fields.insert(key, resolved);
        }

        node.strip_empty();
        Ok(node)
    }

    /// Resolves a relation field value.
    ///
    /// Absent (null or empty-string) input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Propagates errors from element resolvers and root hooks.
    pub fn resolve_relation(
        &mut self,
        input: Value,
        fallback: Option<&Arc<ResolverDefinition>>,
        options: &RelationOptions<'_>,
    ) -> GraphResult<Value> {
        if is_empty_value(&input) {
            return Ok(input);
        }
        let elements = match input {
            Value::Array(items) => items,
            other => vec![other],
        };
        let mut resolved = Vec::with_capacity(elements.len());
        for element in elements {
            resolved.push(self.resolve_relation_element(element, fallback, options)?);
        }
        if !options.array && resolved.len() == 1 {
            return Ok(resolved.pop().unwrap_or(Value::Null));
        }
        Ok(Value::Array(resolved))
    }

    /// [`Graph::resolve_relation`] with the fallback resolver named by tag.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::resolve_relation`].
    pub fn resolve_relation_to(
        &mut self,
        input: Value,
        tag: &str,
        options: &RelationOptions<'_>,
    ) -> GraphResult<Value> {
        let fallback = self.resolver(tag);
        self.resolve_relation(input, fallback.as_ref(), options)
    }

    fn resolve_relation_element(
        &mut self,
        element: Value,
        fallback: Option<&Arc<ResolverDefinition>>,
        options: &RelationOptions<'_>,
    ) -> GraphResult<Value> {
        if let Some(id) = as_id_reference(&element) {
            let canonical = self.find(id).and_then(GraphNode::id).unwrap_or(id);
            return Ok(id_reference(canonical));
        }

        let mut element = element;
        let mut resolver = fallback.cloned();
        if let Value::Object(map) = &mut element {
            if let Some(tag) = map.shift_remove(RESOLVER_KEY) {
                resolver = tag.as_str().and_then(|t| self.resolver(t));
            }
        }
        let Some(resolver) = resolver else {
            return Ok(element);
        };

        let element = match (element, resolver.cast) {
            (Value::Object(map), _) => Value::Object(map),
            (primitive, Some(cast)) => cast(primitive),
            (primitive, None) => primitive,
        };
        let Value::Object(map) = element else {
            return Ok(element);
        };

        let mut node = self.resolve_node(GraphNode::from_map(map), Some(&resolver))?;
        if let Some(after) = options.after_resolve {
            after(&mut node, &self.meta);
        }
        if options.generate_id || options.root {
            node = self.resolve_node_id(node, Some(&resolver), false);
        }
        if options.root {
            node.resolved_by = Some(ResolverRef::Definition(Arc::clone(&resolver)));
            let id = node.id.clone().unwrap_or_default();
            let idx = self.push(node);
            if let Some(hook) = resolver.resolve_root_node {
                hook(idx, self)?;
            }
            return Ok(id_reference(&id));
        }
        Ok(node.into_value())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::meta::{MetaField, MetaInput};
    use crate::resolver::{IdPrefix, ResolverRegistry};

    fn price_cast(v: Value) -> Value {
        let mut map = Map::new();
        map.insert("price".to_string(), v);
        Value::Object(map)
    }

    fn mark_root(idx: crate::graph::NodeIndex, graph: &mut Graph) -> GraphResult<()> {
        graph.set_if_empty(idx, "hooked", json!(true));
        Ok(())
    }

    fn registry() -> Arc<ResolverRegistry> {
        let mut registry = ResolverRegistry::new();
        registry.register(
            ResolverDefinition::new("Price")
                .default_type("PriceSpecification")
                .cast(price_cast)
                .inherit((MetaField::Currency, "priceCurrency")),
        );
        registry.register(
            ResolverDefinition::new("Person")
                .default_type("Person")
                .id_prefix(IdPrefix::Field(MetaField::Host))
                .resolve_root_node(mark_root),
        );
        Arc::new(registry)
    }

    fn graph() -> Graph {
        let mut graph = Graph::with_registry(registry());
        graph.set_meta(MetaInput::for_host("https://example.com/").currency("AUD"));
        graph
    }

    #[test]
    fn primitive_is_cast_and_scalar_returned() {
        let mut g = graph();
        let out = g
            .resolve_relation_to(json!(12.5), "Price", &RelationOptions::default())
            .unwrap();
        assert_eq!(
            out,
            json!({"@type": "PriceSpecification", "price": 12.5, "priceCurrency": "AUD"})
        );
    }

    #[test]
    fn array_option_keeps_single_element_array() {
        let mut g = graph();
        let out = g
            .resolve_relation_to(json!(3), "Price", &RelationOptions::array())
            .unwrap();
        assert!(out.as_array().is_some_and(|a| a.len() == 1));
    }

    #[test]
    fn no_resolver_passes_through() {
        let mut g = graph();
        let out = g
            .resolve_relation(json!(["a", {"x": 1}]), None, &RelationOptions::default())
            .unwrap();
        assert_eq!(out, json!(["a", {"x": 1}]));
    }

    #[test]
    fn absent_input_is_returned_unchanged() {
        let mut g = graph();
        let out = g
            .resolve_relation_to(Value::Null, "Price", &RelationOptions::root())
            .unwrap();
        assert!(out.is_null());
        assert!(g.is_empty());
    }

    #[test]
    fn bare_reference_is_canonicalized() {
        let mut g = graph();
        g.push(GraphNode::new().with_id("https://example.com/#identity"));
        let out = g
            .resolve_relation(
                json!({"@id": "#identity", "@type": "Organization"}),
                None,
                &RelationOptions::default(),
            )
            .unwrap();
        assert_eq!(out, json!({"@id": "https://example.com/#identity"}));

        let unknown = g
            .resolve_relation(json!({"@id": "#nobody"}), None, &RelationOptions::default())
            .unwrap();
        assert_eq!(unknown, json!({"@id": "#nobody"}));
    }

    #[test]
    fn tagged_element_overrides_fallback() {
        let mut g = graph();
        let out = g
            .resolve_relation_to(
                json!({"_resolver": "Person", "name": "Harlan"}),
                "Price",
                &RelationOptions::default(),
            )
            .unwrap();
        assert_eq!(out, json!({"@type": "Person", "name": "Harlan"}));
    }

    #[test]
    fn root_promotion_pushes_and_references() {
        let mut g = graph();
        let out = g
            .resolve_relation_to(json!({"name": "Harlan"}), "Person", &RelationOptions::root())
            .unwrap();
        let id = out["@id"].as_str().unwrap();
        assert!(id.starts_with("https://example.com/#/schema/person/"));
        assert_eq!(out.as_object().unwrap().len(), 1);
        let promoted = g.find(id).unwrap();
        assert_eq!(promoted.get("hooked"), Some(&json!(true)));
    }

    #[test]
    fn after_resolve_runs_before_identity() {
        let mut g = graph();
        let set_id = |node: &mut GraphNode, meta: &ResolvedMeta| {
            node.id = Some(format!("{}#me", meta.host.clone().unwrap_or_default()));
        };
        let options = RelationOptions::root().after_resolve(&set_id);
        let out = g
            .resolve_relation_to(json!({"name": "Harlan"}), "Person", &options)
            .unwrap();
        assert_eq!(out, json!({"@id": "https://example.com/#me"}));
    }

    #[test]
    fn nested_tagged_values_resolve_in_pipeline() {
        let mut g = graph();
        let node = GraphNode::from_value(json!({
            "name": "Post",
            "author": {"_resolver": "Person", "name": "Harlan"},
            "empty": "",
        }))
        .unwrap();
        let node = g.resolve_node(node, None).unwrap();
        assert_eq!(node.get("author"), Some(&json!({"@type": "Person", "name": "Harlan"})));
        assert!(node.get("empty").is_none());
    }

    #[test]
    fn tagged_values_inside_arrays_resolve_in_pipeline() {
        let mut g = graph();
        let node = GraphNode::from_value(json!({
            "name": "Post",
            "contributor": [
                {"_resolver": "Person", "name": "A"},
                "plain",
                {"_resolver": "NoSuchType", "name": "B"},
            ],
        }))
        .unwrap();
        let node = g.resolve_node(node, None).unwrap();
        assert_eq!(
            node.get("contributor"),
            Some(&json!([{"@type": "Person", "name": "A"}, "plain", {"name": "B"}]))
        );
    }
}
