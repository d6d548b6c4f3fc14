use serde_json::{Map, Value};

use super::{absolute_url, as_array, link, reference_at, PRIMARY_BREADCRUMB_ID, PRIMARY_WEB_PAGE_ID};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::MetaField;
use crate::node::GraphNode;
use crate::relation::RelationOptions;
use crate::resolver::{IdPrefix, ResolverDefinition};

const ITEMS: &str = "itemListElement";
const POSITION: &str = "position";

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("Breadcrumb")
        .default_type("BreadcrumbList")
        .id_prefix(IdPrefix::Root {
            field: MetaField::Url,
            alias: PRIMARY_BREADCRUMB_ID.to_string(),
        })
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

pub(super) fn list_item_resolver() -> ResolverDefinition {
    ResolverDefinition::new("ListItem")
        .default_type("ListItem")
        .cast(name_cast)
        .resolve(resolve_list_item)
}

fn name_cast(value: Value) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), value);
    Value::Object(map)
}

/// Items without a position take their 1-based array index.
fn assign_positions(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let mut item = match item {
                Value::Object(map) => map,
                Value::Null => return Value::Null,
                other => match name_cast(other) {
                    Value::Object(map) => map,
                    other => return other,
                },
            };
            if item.get(POSITION).map_or(true, Value::is_null) {
                item.insert(POSITION.to_string(), Value::from(i + 1));
            }
            Value::Object(item)
        })
        .collect()
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    let items = assign_positions(as_array(node.take(ITEMS)));
    if !items.is_empty() {
        let items =
            graph.resolve_relation_to(Value::Array(items), "ListItem", &RelationOptions::array())?;
        node.set(ITEMS, items);
    }
    Ok(node)
}

fn resolve_list_item(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    absolute_url(&mut node, "item", graph.meta());
    Ok(node)
}

fn position_of(item: &Value) -> f64 {
    item.get(POSITION).and_then(Value::as_f64).unwrap_or(f64::MAX)
}

/// Merged trails are re-ordered by position; ties keep arrival order.
fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    if let Some(node) = graph.node_mut(idx) {
        if let Some(Value::Array(items)) = node.fields.get_mut(ITEMS) {
            items.sort_by(|a, b| position_of(a).total_cmp(&position_of(b)));
        }
    }
    let trail = reference_at(graph, idx);
    link(graph, PRIMARY_WEB_PAGE_ID, "breadcrumb", trail);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::MetaInput;

    #[test]
    fn positions_fill_from_index() {
        let items = assign_positions(vec![
            json!("Home"),
            json!({"name": "Blog", "position": 7}),
            json!({"name": "Post"}),
        ]);
        assert_eq!(items[0], json!({"name": "Home", "position": 1}));
        assert_eq!(items[1]["position"], 7);
        assert_eq!(items[2]["position"], 3);
    }

    #[test]
    fn list_items_resolve_item_urls() {
        let mut graph = Graph::new();
        graph
            .push_value(json!({
                "_resolver": "BreadcrumbList",
                "itemListElement": [
                    {"name": "Home", "item": "/"},
                    {"name": "Blog", "item": "/blog"},
                ],
            }))
            .unwrap();
        let out = graph
            .resolve_graph(MetaInput::for_host("https://example.com/").path("/blog/post"))
            .unwrap();
        let trail = &out[0];
        assert_eq!(trail["@id"], "https://example.com/blog/post/#breadcrumb");
        assert_eq!(trail["@type"], "BreadcrumbList");
        assert_eq!(
            trail["itemListElement"],
            json!([
                {
                    "@type": "ListItem",
                    "item": "https://example.com/",
                    "name": "Home",
                    "position": 1,
                },
                {
                    "@type": "ListItem",
                    "item": "https://example.com/blog",
                    "name": "Blog",
                    "position": 2,
                },
            ])
        );
    }
}
