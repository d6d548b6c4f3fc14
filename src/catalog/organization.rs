use serde_json::Value;

use super::{
    has_graph_key, is_home_page, link, reference_at, reference_to, IDENTITY_ID, LOGO_ID,
    PRIMARY_WEB_PAGE_ID, PRIMARY_WEB_SITE_ID,
};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::{MetaField, ResolvedMeta};
use crate::node::GraphNode;
use crate::relation::RelationOptions;
use crate::resolver::{IdPrefix, ResolverDefinition};
use crate::util::prefix_id;

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("Organization")
        .default_type("Organization")
        .inherit((MetaField::Host, "url"))
        .id_prefix(IdPrefix::Root {
            field: MetaField::Host,
            alias: IDENTITY_ID.to_string(),
        })
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    if let Some(same_as) = node.get("sameAs").filter(|v| v.is_string()).cloned() {
        node.set("sameAs", Value::Array(vec![same_as]));
    }
    super::absolute_url(&mut node, "url", graph.meta());
    Ok(node)
}

fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    if !has_graph_key(graph, idx, IDENTITY_ID) {
        return Ok(());
    }
    let Some(node) = graph.node_mut(idx) else {
        return Ok(());
    };
    let name = node.get_str("name").unwrap_or_default().to_string();
    let logo = node.take("logo");

    if !logo.is_null() {
        let as_logo = |image: &mut GraphNode, meta: &ResolvedMeta| {
            image.id = Some(prefix_id(meta.get_or_empty(MetaField::Host), LOGO_ID));
            image.set_if_empty("caption", Value::String(name.clone()));
        };
        let options = RelationOptions::root().after_resolve(&as_logo);
        let logo = graph.resolve_relation_to(logo, "ImageObject", &options)?;
        if let Some(node) = graph.node_mut(idx) {
            node.set("logo", logo);
        }
        let logo_ref = reference_to(graph, LOGO_ID);
        link(graph, PRIMARY_WEB_PAGE_ID, "primaryImageOfPage", logo_ref);
    }

    let identity = reference_at(graph, idx);
    if is_home_page(graph.meta()) {
        link(graph, PRIMARY_WEB_PAGE_ID, "about", identity.clone());
    }
    link(graph, PRIMARY_WEB_SITE_ID, "publisher", identity);
    Ok(())
}
