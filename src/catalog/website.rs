use super::{
    link, reference_at, reference_to, IDENTITY_ID, PRIMARY_WEB_PAGE_ID, PRIMARY_WEB_SITE_ID,
};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::MetaField;
use crate::resolver::{IdPrefix, ResolverDefinition};

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("WebSite")
        .default_type("WebSite")
        .inherit(MetaField::InLanguage)
        .inherit((MetaField::Host, "url"))
        .id_prefix(IdPrefix::Root {
            field: MetaField::Host,
            alias: PRIMARY_WEB_SITE_ID.to_string(),
        })
        .resolve_root_node(resolve_root)
}

fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    let identity = reference_to(graph, IDENTITY_ID);
    if let Some(identity) = identity {
        graph.set_if_empty(idx, "publisher", identity);
    }
    let site = reference_at(graph, idx);
    link(graph, PRIMARY_WEB_PAGE_ID, "isPartOf", site);
    Ok(())
}
