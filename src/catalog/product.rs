use serde_json::{Map, Value};

use super::{reference_to, IDENTITY_ID, PRIMARY_WEB_PAGE_ID, PRODUCT_ID};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::MetaField;
use crate::node::GraphNode;
use crate::relation::RelationOptions;
use crate::resolver::{IdPrefix, ResolverDefinition};
use crate::util::{has_protocol, to_iso_date};

const SCHEMA_ORG_PREFIX: &str = "https://schema.org/";

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("Product")
        .default_type("Product")
        .inherit((MetaField::Title, "name"))
        .inherit(MetaField::Description)
        .id_prefix(IdPrefix::Root {
            field: MetaField::Url,
            alias: PRODUCT_ID.to_string(),
        })
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

pub(super) fn offer_resolver() -> ResolverDefinition {
    ResolverDefinition::new("Offer")
        .default_type("Offer")
        .cast(price_cast)
        .inherit((MetaField::Currency, "priceCurrency"))
        .resolve(resolve_offer)
}

fn price_cast(value: Value) -> Value {
    let mut map = Map::new();
    map.insert("price".to_string(), value);
    Value::Object(map)
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    let offers = node.take("offers");
    let offers = graph.resolve_relation_to(offers, "Offer", &RelationOptions::array())?;
    node.set("offers", offers);
    Ok(node)
}

fn resolve_offer(mut node: GraphNode, _graph: &mut Graph) -> GraphResult<GraphNode> {
    node.set_if_empty("availability", Value::String("InStock".to_string()));
    if let Some(availability) = node.get_str("availability").filter(|a| !has_protocol(a)) {
        let prefixed = format!("{SCHEMA_ORG_PREFIX}{availability}");
        node.set("availability", Value::String(prefixed));
    }
    if let Some(date) = node.get_str("priceValidUntil").map(to_iso_date) {
        node.set("priceValidUntil", Value::String(date));
    }
    Ok(node)
}

fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    let identity = graph
        .find(IDENTITY_ID)
        .filter(|n| n.has_type("Organization"))
        .and_then(GraphNode::id)
        .map(crate::node::id_reference);
    let webpage = reference_to(graph, PRIMARY_WEB_PAGE_ID);
    for (field, value) in [("brand", identity), ("mainEntityOfPage", webpage)] {
        if let Some(value) = value {
            graph.set_if_empty(idx, field, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Graph, MetaInput};

    #[test]
    fn offers_cast_and_inherit_currency() {
        let mut graph = Graph::new();
        graph
            .push_value(json!([
                {"_resolver": "Product", "offers": [
                    19.99,
                    {"price": 5, "availability": "https://schema.org/SoldOut"},
                ]},
                {"_resolver": "Organization", "name": "Acme"},
                {"_resolver": "WebPage"},
            ]))
            .unwrap();
        let out = graph
            .resolve_graph(
                MetaInput::for_host("https://example.com/")
                    .path("/shop/widget")
                    .title("Widget")
                    .currency("AUD"),
            )
            .unwrap();
        let product = &out[0];
        assert_eq!(product["@id"], "https://example.com/shop/widget/#product");
        assert_eq!(product["name"], "Widget");
        assert_eq!(
            product["offers"],
            json!([
                {
                    "@type": "Offer",
                    "availability": "https://schema.org/InStock",
                    "price": 19.99,
                    "priceCurrency": "AUD",
                },
                {
                    "@type": "Offer",
                    "availability": "https://schema.org/SoldOut",
                    "price": 5,
                    "priceCurrency": "AUD",
                },
            ])
        );
        assert_eq!(product["brand"], json!({"@id": "https://example.com/#identity"}));
        assert_eq!(
            product["mainEntityOfPage"],
            json!({"@id": "https://example.com/shop/widget/#webpage"})
        );
    }
}
