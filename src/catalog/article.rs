use serde_json::Value;

use super::{
    as_array, link, normalize_dates, reference_at, reference_to, webpage::read_action,
    IDENTITY_ID, PRIMARY_ARTICLE_ID, PRIMARY_WEB_PAGE_ID,
};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::MetaField;
use crate::node::{as_id_reference, GraphNode};
use crate::relation::RelationOptions;
use crate::resolver::{IdPrefix, ResolverDefinition};

/// Longest headline search engines accept.
const MAX_HEADLINE_CHARS: usize = 110;

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new("Article")
        .default_type("Article")
        .inherit(MetaField::InLanguage)
        .inherit(MetaField::Description)
        .inherit(MetaField::Image)
        .inherit(MetaField::DateModified)
        .inherit(MetaField::DatePublished)
        .inherit((MetaField::Title, "headline"))
        .id_prefix(IdPrefix::Root {
            field: MetaField::Url,
            alias: PRIMARY_ARTICLE_ID.to_string(),
        })
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

fn truncate_headline(headline: &str) -> Option<String> {
    if headline.chars().count() <= MAX_HEADLINE_CHARS {
        return None;
    }
    let mut out: String = headline.chars().take(MAX_HEADLINE_CHARS - 3).collect();
    out.push_str("...");
    Some(out)
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    if let Some(headline) = node.get_str("headline").and_then(truncate_headline) {
        node.set("headline", Value::String(headline));
    }
    normalize_dates(&mut node, &["datePublished", "dateModified"]);

    let author = node.take("author");
    let author = graph.resolve_relation_to(author, "Person", &RelationOptions::root())?;
    node.set("author", author);
    let publisher = node.take("publisher");
    let publisher = graph.resolve_relation_to(publisher, "Organization", &RelationOptions::root())?;
    node.set("publisher", publisher);
    Ok(node)
}

/// Url of the first image, following a reference into the graph.
fn first_image_url(graph: &Graph, image: Option<&Value>) -> Option<String> {
    let first = as_array(image?.clone()).into_iter().next()?;
    match &first {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => match as_id_reference(&first) {
            Some(id) => graph.find(id)?.get_str("url").map(str::to_string),
            None => map.get("url").and_then(Value::as_str).map(str::to_string),
        },
        _ => None,
    }
}

fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    let image = graph.node(idx).and_then(|n| n.get("image")).cloned();
    if let Some(thumbnail) = first_image_url(graph, image.as_ref()) {
        graph.set_if_empty(idx, "thumbnailUrl", Value::String(thumbnail));
    }

    let identity_idx = graph.find_index(IDENTITY_ID);
    if let Some(identity_idx) = identity_idx {
        let identity = reference_at(graph, identity_idx);
        let is_person = graph.node(identity_idx).is_some_and(|n| n.has_type("Person"));
        if let Some(identity) = identity {
            graph.set_if_empty(idx, "publisher", identity.clone());
            if is_person {
                graph.set_if_empty(idx, "author", identity);
            }
        }
    }

    if let Some(webpage) = reference_to(graph, PRIMARY_WEB_PAGE_ID) {
        graph.set_if_empty(idx, "isPartOf", webpage.clone());
        graph.set_if_empty(idx, "mainEntityOfPage", webpage);
    }

    let (published, modified) = match graph.node(idx) {
        Some(article) => (
            article.get("datePublished").cloned(),
            article.get("dateModified").cloned(),
        ),
        None => (None, None),
    };
    let url = graph.meta().url.clone();
    link(graph, PRIMARY_WEB_PAGE_ID, "potentialAction", url.as_deref().map(read_action));
    link(graph, PRIMARY_WEB_PAGE_ID, "datePublished", published);
    link(graph, PRIMARY_WEB_PAGE_ID, "dateModified", modified);
    Ok(())
}
