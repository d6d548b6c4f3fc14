use serde_json::{Map, Value};

use super::{absolute_url, link, reference_at, PRIMARY_ARTICLE_ID};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::MetaField;
use crate::node::GraphNode;
use crate::resolver::{IdPrefix, ResolverDefinition};

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("Person")
        .default_type("Person")
        .cast(cast)
        .id_prefix(IdPrefix::Field(MetaField::Host))
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

fn cast(value: Value) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), value);
    Value::Object(map)
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    absolute_url(&mut node, "url", graph.meta());
    Ok(node)
}

/// A person in the graph authors the primary article unless it names an author.
fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    let me = reference_at(graph, idx);
    link(graph, PRIMARY_ARTICLE_ID, "author", me);
    Ok(())
}
