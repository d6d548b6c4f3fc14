//! Built-in resolver catalog.
//!
//! A representative set of Schema.org entity types, each expressed purely as
//! a [`ResolverDefinition`]. Singleton entities take a root alias so that
//! other nodes can link to them by fragment (`#identity`, `#webpage`, ...)
//! regardless of registration order.

mod action;
mod article;
mod breadcrumb;
mod image;
mod organization;
mod person;
mod product;
mod webpage;
mod website;

use serde_json::Value;

use crate::graph::{graph_key, Graph, NodeIndex};
use crate::meta::{MetaField, ResolvedMeta};
use crate::node::{id_reference, GraphNode};
use crate::resolver::ResolverRegistry;
use crate::util::{resolve_with_base, to_iso_date, without_trailing_slash};

pub use webpage::page_type_for_path;

/// Site owner (`Organization` or `Person`).
pub const IDENTITY_ID: &str = "#identity";
/// The page being described.
pub const PRIMARY_WEB_PAGE_ID: &str = "#webpage";
/// The site the page belongs to.
pub const PRIMARY_WEB_SITE_ID: &str = "#website";
/// Main article of the page.
pub const PRIMARY_ARTICLE_ID: &str = "#article";
/// Breadcrumb trail of the page.
pub const PRIMARY_BREADCRUMB_ID: &str = "#breadcrumb";
/// Main product of the page.
pub const PRODUCT_ID: &str = "#product";
/// Identity logo.
pub const LOGO_ID: &str = "#logo";

/// Registers every built-in resolver, with its tag aliases.
pub fn register_builtin(registry: &mut ResolverRegistry) {
    registry.register(organization::resolver());
    registry.register(person::resolver());
    let image = registry.register(image::resolver());
    registry.register_alias("Image", &image);
    registry.register(website::resolver());
    registry.register(webpage::resolver());
    registry.register(article::resolver());
    let breadcrumb = registry.register(breadcrumb::resolver());
    registry.register_alias("BreadcrumbList", &breadcrumb);
    registry.register(breadcrumb::list_item_resolver());
    registry.register(action::read_action_resolver());
    registry.register(product::offer_resolver());
    registry.register(product::resolver());
}

/// Bare reference to the node answering `key`, if present.
pub(crate) fn reference_to(graph: &Graph, key: &str) -> Option<Value> {
    graph.find(key).and_then(GraphNode::id).map(id_reference)
}

/// Bare reference to the node behind a handle.
pub(crate) fn reference_at(graph: &Graph, idx: NodeIndex) -> Option<Value> {
    graph.node(idx).and_then(GraphNode::id).map(id_reference)
}

/// Set-if-empty on the node answering `target`. No-op when either side is absent.
pub(crate) fn link(graph: &mut Graph, target: &str, field: &str, value: Option<Value>) -> bool {
    match (graph.find_index(target), value) {
        (Some(idx), Some(value)) => graph.set_if_empty(idx, field, value),
        _ => false,
    }
}

/// Returns true if the node's graph key equals `fragment` (given with its `#`).
pub(crate) fn has_graph_key(graph: &Graph, idx: NodeIndex, fragment: &str) -> bool {
    graph
        .node(idx)
        .and_then(GraphNode::id)
        .is_some_and(|id| graph_key(id) == fragment.trim_start_matches('#'))
}

/// Rewrites string date fields to RFC 3339.
pub(crate) fn normalize_dates(node: &mut GraphNode, keys: &[&str]) {
    for key in keys {
        if let Some(date) = node.get_str(key).map(to_iso_date) {
            node.set(*key, Value::String(date));
        }
    }
}

/// Resolves a root-relative string field against the host.
pub(crate) fn absolute_url(node: &mut GraphNode, key: &str, meta: &ResolvedMeta) {
    let host = meta.get_or_empty(MetaField::Host);
    if let Some(url) = node.get_str(key).map(|u| resolve_with_base(host, u)) {
        node.set(key, Value::String(url));
    }
}

/// The page url is the site root.
pub(crate) fn is_home_page(meta: &ResolvedMeta) -> bool {
    match (meta.url.as_deref(), meta.host.as_deref()) {
        (Some(url), Some(host)) => without_trailing_slash(url) == without_trailing_slash(host),
        _ => false,
    }
}

/// Wraps a lone value into a one-element array.
pub(crate) fn as_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::meta::{resolve_meta, MetaInput};

    #[test]
    fn builtin_registers_aliases() {
        let registry = ResolverRegistry::builtin();
        let breadcrumb = registry.get("Breadcrumb").unwrap();
        let list = registry.get("breadcrumblist").unwrap();
        assert!(std::sync::Arc::ptr_eq(&breadcrumb, &list));
        assert!(registry.contains("image"));
    }

    #[test]
    fn home_page_ignores_trailing_slash() {
        assert!(is_home_page(&resolve_meta(MetaInput::for_host("https://example.com"))));
        assert!(!is_home_page(&resolve_meta(
            MetaInput::for_host("https://example.com/").path("/about")
        )));
        assert!(!is_home_page(&ResolvedMeta::default()));
    }

    #[test]
    fn link_is_set_if_empty() {
        let mut graph = Graph::new();
        graph.push(
            GraphNode::new()
                .with_id("https://e.com/#webpage")
                .with_field("about", json!({"@id": "x"})),
        );
        graph.push(GraphNode::new().with_id("https://e.com/#identity"));
        let identity = reference_to(&graph, IDENTITY_ID);
        assert!(!link(&mut graph, PRIMARY_WEB_PAGE_ID, "about", identity.clone()));
        assert!(link(&mut graph, PRIMARY_WEB_PAGE_ID, "publisher", identity));
        assert!(!link(&mut graph, "#missing", "about", Some(json!(1))));
        assert_eq!(
            graph.find("#webpage").unwrap().get("publisher"),
            Some(&json!({"@id": "https://e.com/#identity"}))
        );
    }

    #[test]
    fn dates_are_normalized_in_place() {
        let mut node = GraphNode::new()
            .with_field("datePublished", "2021-10-10")
            .with_field("dateModified", 5);
        normalize_dates(&mut node, &["datePublished", "dateModified", "missing"]);
        assert_eq!(node.get_str("datePublished"), Some("2021-10-10T00:00:00Z"));
        assert_eq!(node.get("dateModified"), Some(&json!(5)));
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn as_array_wraps_scalars() {
        assert_eq!(as_array(json!("a")), vec![json!("a")]);
        assert!(as_array(Value::Null).is_empty());
        assert_eq!(as_array(json!([1, 2])).len(), 2);
    }
}
