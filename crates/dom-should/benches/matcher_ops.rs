//! Matcher Operations Benchmarks
//!
//! Benchmarks for selector resolution, markup normalization, namespace
//! matching and end-to-end matcher evaluation.
//!
//! Run with: `cargo bench --bench matcher_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dom_should::prelude::*;
use dom_should::{namespace_covers, normalize, MatcherArg};

fn fixture() -> Document {
    let rows: String = (0..50)
        .map(|i| {
            format!(
                r#"<li class="row{}" data-index="{i}"><span>item {i}</span><input type="checkbox"{}></li>"#,
                if i % 2 == 0 { " even" } else { "" },
                if i % 3 == 0 { " checked" } else { "" }
            )
        })
        .collect();
    Document::parse(&format!(r#"<div id="app"><ul class="list">{rows}</ul></div>"#)).unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let doc = fixture();

    let selectors = vec![
        ("id", "#app"),
        ("class", ".even"),
        ("descendant", "ul li span"),
        ("child", "ul > li.even > input"),
        ("attribute", "[data-index=\"7\"]"),
        ("pseudo", "input:checked"),
    ];

    for (name, selector) in selectors {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| black_box(doc.resolve(black_box(sel)).unwrap()));
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let doc = Document::new();
    let html = r#"<DIV Class='a b'><SPAN title="x &amp; y">text</SPAN><BR><IMG SRC=a.png></DIV>"#;
    c.bench_function("normalize_fragment", |bench| {
        bench.iter(|| black_box(normalize(&doc, black_box(html)).unwrap()));
    });
}

fn bench_namespaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("namespace_covers");

    for size in [1usize, 4, 16] {
        let bound: Vec<String> = (0..size * 2).map(|i| format!("ns{i}")).collect();
        let requested: Vec<String> = (0..size).map(|i| format!("ns{}", i * 2)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bench, _| {
            bench.iter(|| black_box(namespace_covers(black_box(&bound), black_box(&requested))));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let doc = fixture();
    let registry = MatcherRegistry::with_catalogue();
    let config = ShouldConfig::default();

    c.bench_function("evaluate_have_class", |bench| {
        bench.iter(|| {
            let target = doc.resolve("li").unwrap();
            let args = [MatcherArg::from("even")];
            black_box(
                registry
                    .evaluate("haveClass", &doc, target, &args, false, &config)
                    .unwrap(),
            )
        });
    });

    c.bench_function("should_contain_text", |bench| {
        bench.iter(|| black_box(should(&doc, "ul").unwrap().contain_text("item 49")));
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_normalize,
    bench_namespaces,
    bench_evaluate
);
criterion_main!(benches);
