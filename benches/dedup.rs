// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for the per-call observation path.
//!
//! Run with: `cargo bench --bench dedup`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use url::Url;

use request_sentinel::telemetry::SentinelMetrics;
use request_sentinel::{ApiKind, ObservedCall, OriginDeduplicator, SentinelConfig, Target};

fn deduplicator() -> OriginDeduplicator {
    let config = SentinelConfig::new("bench-key", "1.0.0", "bench")
        .with_document_origin(Url::parse("https://app.example.com").unwrap());
    OriginDeduplicator::new(Arc::new(config), Arc::new(SentinelMetrics::new()))
}

/// Benchmark canonicalization of the target shapes seen in practice.
fn bench_canonical_origin(c: &mut Criterion) {
    let dedup = deduplicator();
    let targets = [
        ("absolute", Target::from("https://api.example.com/v1/users?page=2#top")),
        ("relative", Target::from("/api/example")),
        ("with_port", Target::from("http://localhost:8080/health")),
        ("parsed", Target::from(Url::parse("https://cdn.example.net/lib.js").unwrap())),
    ];

    let mut group = c.benchmark_group("canonical_origin");
    group.throughput(Throughput::Elements(1));

    for (name, target) in &targets {
        group.bench_with_input(BenchmarkId::from_parameter(name), target, |b, target| {
            b.iter(|| dedup.canonical_origin(black_box(target)));
        });
    }

    group.finish();
}

/// Benchmark admission once the seen set is warm, the steady state of a host.
fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");

    for origins in [1usize, 10, 100, 1000] {
        let dedup = deduplicator();
        for i in 0..origins {
            dedup.should_report(&ObservedCall::new(
                ApiKind::Fetch,
                "GET",
                format!("https://svc{i}.example.com/"),
            ));
        }

        let call = ObservedCall::new(ApiKind::Fetch, "GET", "https://svc0.example.com/v1/items");
        group.bench_with_input(BenchmarkId::new("duplicate", origins), &call, |b, call| {
            b.iter(|| dedup.should_report(black_box(call)));
        });
    }

    let dedup = deduplicator();
    let call = ObservedCall::new(ApiKind::XmlHttpRequest, "GET", "::not a url::");
    group.bench_function("malformed", |b| {
        b.iter(|| dedup.should_report(black_box(&call)));
    });

    group.finish();
}

criterion_group!(benches, bench_canonical_origin, bench_admission);
criterion_main!(benches);
