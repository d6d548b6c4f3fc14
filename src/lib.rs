//! # schemaorg-graph - Linked-data graph resolution for Schema.org
//!
//! Turns loosely-typed, caller-authored entity descriptions into a single
//! deduplicated, cross-referenced, deterministically-ordered Schema.org graph,
//! ready to be embedded as a JSON-LD document.
//!
//! ## Core Concepts
//!
//! - **GraphNode**: a JSON object with reserved `@id`, `@type`, resolver tag and
//!   dedupe strategy slots
//! - **ResolverDefinition**: the per-type behavior record (defaults, cast,
//!   inherited context, resolve function, root hook, id policy)
//! - **Graph**: owns the nodes and the multi-key index, and runs the two-pass
//!   resolution
//! - **ResolvedMeta**: the page context every resolver reads from
//!
//! ## Usage
//!
//! ```
//! use schemaorg_graph::{Graph, GraphNode, MetaInput};
//! use serde_json::json;
//!
//! let mut graph = Graph::new();
//! graph.push(GraphNode::tagged("WebPage"));
//! graph.push(
//!     GraphNode::tagged("Organization")
//!         .with_field("name", "Harlan Wilton")
//!         .with_field("logo", "/logo.png"),
//! );
//!
//! let doc = graph
//!     .to_document(MetaInput::for_host("https://example.com/").title("Home"))
//!     .unwrap();
//! let nodes = doc["@graph"].as_array().unwrap();
//! assert_eq!(nodes[1]["@id"], json!("https://example.com/#identity"));
//! assert_eq!(nodes[0]["about"], json!({"@id": "https://example.com/#identity"}));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core model
pub mod config;
pub mod error;
pub mod meta;
pub mod node;
pub mod util;

// Resolution engine
pub mod graph;
pub mod identity;
pub mod relation;
pub mod resolver;

// Built-in entity types
pub mod catalog;

// Re-export primary types at crate root for convenience
pub use catalog::{
    IDENTITY_ID, LOGO_ID, PRIMARY_ARTICLE_ID, PRIMARY_BREADCRUMB_ID, PRIMARY_WEB_PAGE_ID,
    PRIMARY_WEB_SITE_ID, PRODUCT_ID,
};
pub use config::{CollisionPolicy, GraphConfig};
pub use error::{GraphError, GraphResult};
pub use graph::{
    domain_key, graph_key, normalize_node, render_document, Graph, NodeIndex, SCHEMA_ORG_CONTEXT,
};
pub use meta::{resolve_meta, MetaField, MetaInput, ResolvedMeta};
pub use node::{id_reference, DedupeStrategy, GraphNode};
pub use relation::RelationOptions;
pub use resolver::{
    Defaults, IdPrefix, InheritMeta, ResolverDefinition, ResolverRef, ResolverRegistry,
};
