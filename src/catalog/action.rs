use serde_json::Value;

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::node::GraphNode;
use crate::resolver::ResolverDefinition;

pub(super) fn read_action_resolver() -> ResolverDefinition {
    ResolverDefinition::new("ReadAction")
        .default_type("ReadAction")
        .resolve(resolve_read_action)
}

fn resolve_read_action(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    if let Some(url) = graph.meta().url.clone() {
        node.set_if_empty("target", Value::Array(vec![Value::String(url)]));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Graph, MetaInput, RelationOptions};

    #[test]
    fn target_defaults_to_page_url() {
        let mut graph = Graph::new();
        graph.set_meta(MetaInput::for_host("https://example.com/").path("/docs"));
        let out = graph
            .resolve_relation_to(json!({}), "ReadAction", &RelationOptions::default())
            .unwrap();
        assert_eq!(out, json!({"@type": "ReadAction", "target": ["https://example.com/docs"]}));

        let own = graph
            .resolve_relation_to(
                json!({"target": ["https://x.com"]}),
                "ReadAction",
                &RelationOptions::default(),
            )
            .unwrap();
        assert_eq!(own["target"], json!(["https://x.com"]));
    }
}
