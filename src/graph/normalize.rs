//! Deterministic key ordering for emitted nodes.

use serde_json::{Map, Value};

use crate::node::GraphNode;

/// `@context` of emitted documents.
pub const SCHEMA_ORG_CONTEXT: &str = "https://schema.org";

fn is_relation(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Emits a node with primitive-valued keys first, then object/array-valued
/// keys, each group in plain string order. Internal keys are dropped.
#[must_use]
pub fn normalize_node(node: &GraphNode) -> Value {
    let map = node.to_map();
    let (mut primitives, mut relations): (Vec<&String>, Vec<&String>) = map
        .keys()
        .filter(|k| !k.starts_with('_'))
        .partition(|k| !is_relation(&map[k.as_str()]));
    primitives.sort();
    relations.sort();

    let mut out = Map::with_capacity(map.len());
    for key in primitives.into_iter().chain(relations) {
        out.insert(key.clone(), map[key.as_str()].clone());
    }
    Value::Object(out)
}

/// Normalizes every node, in arena order.
#[must_use]
pub fn normalize_nodes(nodes: &[GraphNode]) -> Vec<Value> {
    nodes.iter().map(normalize_node).collect()
}

/// Wraps resolved nodes into a linked-data document.
///
/// ```
/// use schemaorg_graph::render_document;
/// use serde_json::json;
///
/// let doc = render_document(vec![json!({"@id": "https://example.com/#identity"})]);
/// assert_eq!(doc["@context"], "https://schema.org");
/// assert_eq!(doc["@graph"][0]["@id"], "https://example.com/#identity");
/// ```
#[must_use]
pub fn render_document(nodes: Vec<Value>) -> Value {
    let mut doc = Map::with_capacity(2);
    doc.insert("@context".to_string(), Value::String(SCHEMA_ORG_CONTEXT.to_string()));
    doc.insert("@graph".to_string(), Value::Array(nodes));
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn primitives_precede_relations() {
        let node = GraphNode::from_value(json!({
            "logo": {"@id": "#logo"},
            "url": "https://example.com",
            "sameAs": ["https://x.com/a"],
            "name": "Acme",
            "@type": "Organization",
            "@id": "https://example.com/#identity",
            "foundingDate": 2020,
        }))
        .unwrap();
        let value = normalize_node(&node);
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["@id", "@type", "foundingDate", "name", "url", "logo", "sameAs"]
        );
    }

    #[test]
    fn multi_type_counts_as_relation() {
        let node = GraphNode::new()
            .with_id("https://e.com/#webpage")
            .with_type("WebPage")
            .with_type("AboutPage")
            .with_field("name", "About");
        let value = normalize_node(&node);
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["@id", "name", "@type"]);
    }
}
