use serde_json::{Map, Value};

use super::absolute_url;
use crate::error::GraphResult;
use crate::graph::Graph;
use crate::meta::MetaField;
use crate::node::GraphNode;
use crate::resolver::{IdPrefix, ResolverDefinition};

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("ImageObject")
        .default_type("ImageObject")
        .alias("image")
        .cast(cast)
        .inherit(MetaField::InLanguage)
        .id_prefix(IdPrefix::Field(MetaField::Host))
        .resolve(resolve)
}

fn cast(value: Value) -> Value {
    let mut map = Map::new();
    map.insert("url".to_string(), value);
    Value::Object(map)
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    absolute_url(&mut node, "url", graph.meta());
    if let Some(url) = node.get("url").cloned() {
        node.set_if_empty("contentUrl", url);
    }
    // Dimensions are only meaningful as a pair.
    if node.has("width") != node.has("height") {
        node.take("width");
        node.take("height");
    }
    Ok(node)
}
