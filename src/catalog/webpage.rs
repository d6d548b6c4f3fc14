use serde_json::{json, Map, Value};

use super::{
    is_home_page, normalize_dates, reference_to, IDENTITY_ID, PRIMARY_BREADCRUMB_ID,
    PRIMARY_WEB_PAGE_ID, PRIMARY_WEB_SITE_ID,
};
use crate::error::GraphResult;
use crate::graph::{Graph, NodeIndex};
use crate::meta::{MetaField, ResolvedMeta};
use crate::node::{GraphNode, TYPE_KEY};
use crate::relation::RelationOptions;
use crate::resolver::{Defaults, IdPrefix, ResolverDefinition};

const WEB_PAGE: &str = "WebPage";

pub(super) fn resolver() -> ResolverDefinition {
    ResolverDefinition::new(WEB_PAGE)
        .defaults(Defaults::Dynamic(defaults))
        .inherit((MetaField::Title, "name"))
        .inherit(MetaField::Description)
        .inherit(MetaField::InLanguage)
        .inherit(MetaField::DatePublished)
        .inherit(MetaField::DateModified)
        .inherit(MetaField::Url)
        .id_prefix(IdPrefix::Root {
            field: MetaField::Url,
            alias: PRIMARY_WEB_PAGE_ID.to_string(),
        })
        .resolve(resolve)
        .resolve_root_node(resolve_root)
}

/// Page type inferred from the last path segment.
///
/// ```
/// use schemaorg_graph::catalog::page_type_for_path;
///
/// assert_eq!(page_type_for_path("/about"), vec!["WebPage", "AboutPage"]);
/// assert_eq!(page_type_for_path("/blog/post"), vec!["WebPage"]);
/// ```
#[must_use]
pub fn page_type_for_path(path: &str) -> Vec<&'static str> {
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let specific = match segment {
        "about" | "about-us" => Some("AboutPage"),
        "contact" | "contact-us" => Some("ContactPage"),
        "search" => Some("SearchResultsPage"),
        "checkout" => Some("CheckoutPage"),
        "faq" => Some("FAQPage"),
        _ => None,
    };
    match specific {
        Some(ty) => vec![WEB_PAGE, ty],
        None => vec![WEB_PAGE],
    }
}

fn defaults(meta: &ResolvedMeta) -> Map<String, Value> {
    let types = page_type_for_path(&meta.path);
    let mut map = Map::new();
    let value = if types.len() == 1 { json!(types[0]) } else { json!(types) };
    map.insert(TYPE_KEY.to_string(), value);
    map
}

/// Plain pages advertise themselves as readable.
pub(super) fn read_action(url: &str) -> Value {
    json!([{"@type": "ReadAction", "target": [url]}])
}

fn resolve(mut node: GraphNode, graph: &mut Graph) -> GraphResult<GraphNode> {
    normalize_dates(&mut node, &["datePublished", "dateModified"]);

    if node.types == [WEB_PAGE] {
        if let Some(url) = node.get_str("url").map(str::to_string) {
            node.set_if_empty("potentialAction", read_action(&url));
        }
    }

    let action = node.take("potentialAction");
    let action = graph.resolve_relation_to(action, "ReadAction", &RelationOptions::array())?;
    node.set("potentialAction", action);

    let about = node.take("about");
    let about = graph.resolve_relation(about, None, &RelationOptions::default())?;
    node.set("about", about);
    let author = node.take("author");
    let author = graph.resolve_relation_to(author, "Person", &RelationOptions::root())?;
    node.set("author", author);
    let image = node.take("primaryImageOfPage");
    let image = graph.resolve_relation_to(image, "ImageObject", &RelationOptions::default())?;
    node.set("primaryImageOfPage", image);
    Ok(node)
}

fn resolve_root(idx: NodeIndex, graph: &mut Graph) -> GraphResult<()> {
    let home = is_home_page(graph.meta());
    let identity = reference_to(graph, IDENTITY_ID).filter(|_| home);
    let website = reference_to(graph, PRIMARY_WEB_SITE_ID);
    let breadcrumb = reference_to(graph, PRIMARY_BREADCRUMB_ID);
    for (field, value) in [("about", identity), ("isPartOf", website), ("breadcrumb", breadcrumb)] {
        if let Some(value) = value {
            graph.set_if_empty(idx, field, value);
        }
    }
    Ok(())
}
