use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Value};

use schemaorg_graph::{Graph, MetaInput};

fn meta() -> MetaInput {
    MetaInput::for_host("https://example.com/")
        .path("/blog/post")
        .title("Benchmark post")
        .in_language("en")
}

/// A typical blog post page: site, page, article, identity, trail and authors.
fn page_nodes() -> Vec<Value> {
    vec![
        json!({"_resolver": "WebSite", "name": "Example"}),
        json!({"_resolver": "WebPage"}),
        json!({"_resolver": "Organization", "name": "Acme", "logo": "/logo.png"}),
        json!({
            "_resolver": "Article",
            "image": "/cover.png",
            "author": ["Harlan Wilton", {"name": "Second Author", "url": "/team/second"}],
            "datePublished": "2024-01-01",
        }),
        json!({"_resolver": "Breadcrumb", "itemListElement": [
            {"name": "Home", "item": "/"},
            {"name": "Blog", "item": "/blog"},
            {"name": "Post"},
        ]}),
    ]
}

/// `n` untyped nodes, every second one a duplicate.
fn duplicated_nodes(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"@type": "Thing", "name": format!("thing-{}", i / 2)}))
        .collect()
}

fn bench_page_graph(c: &mut Criterion) {
    c.bench_function("resolve_graph/blog_post_page", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut graph = Graph::new();
                graph.push_value(Value::Array(page_nodes())).unwrap();
                black_box(graph.resolve_graph(meta()).unwrap());
            }
            start.elapsed()
        });
    });
}

fn bench_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_graph_dedupe");
    for size in [64usize, 512] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("duplicated_{size}"), |b| {
            b.iter_custom(|iters| {
                let mut total = std::time::Duration::ZERO;
                for _ in 0..iters {
                    let mut graph = Graph::new();
                    graph.push_value(Value::Array(duplicated_nodes(size))).unwrap();
                    // Only resolution is measured, not node construction.
                    let start = Instant::now();
                    black_box(graph.resolve_graph(meta()).unwrap());
                    total += start.elapsed();
                }
                total
            });
        });
    }
    group.finish();
}

criterion_group!(resolve, bench_page_graph, bench_dedupe);
criterion_main!(resolve);
