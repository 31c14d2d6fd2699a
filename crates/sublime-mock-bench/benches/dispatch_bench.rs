//! Stub dispatch benchmarks.
//!
//! Compares calls through an untraced catalog with calls through the
//! plain and JSON trace wrappers. Trace output goes to a sink console so
//! only the wrapper cost is measured.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use sublime_mock_api::context::NoClipboard;
use sublime_mock_api::{Arg, CatalogBuilder, Console, HostContext, TraceMode};

struct SinkConsole;

impl Console for SinkConsole {
    fn out(&self, line: &str) {
        black_box(line);
    }

    fn err(&self, line: &str) {
        black_box(line);
    }

    fn trace(&self, line: &str) {
        black_box(line);
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let ctx = HostContext::new(Arc::new(SinkConsole), Arc::new(NoClipboard));
    let mut group = c.benchmark_group("dispatch");
    for mode in [TraceMode::Off, TraceMode::Plain, TraceMode::Json] {
        let catalog = CatalogBuilder::new().trace(mode).build();
        group.bench_with_input(
            BenchmarkId::new("view_text_point", mode.as_str()),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    let args = vec![Arg::from(json!(1)), Arg::from(json!(10)), Arg::from(json!(4))];
                    black_box(catalog.call("view_text_point", args, &ctx).expect("call"));
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("encode_value", mode.as_str()),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    let args = vec![Arg::from(json!({"a": [1, 2, 3]})), Arg::from(json!(true))];
                    black_box(catalog.call("encode_value", args, &ctx).expect("call"));
                });
            },
        );
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("catalog_build_plain", |b| {
        b.iter(|| black_box(CatalogBuilder::new().trace(TraceMode::Plain).build()));
    });
    c.bench_function("catalog_fingerprint", |b| {
        let catalog = CatalogBuilder::new().build();
        b.iter(|| black_box(catalog.fingerprint()));
    });
}

criterion_group!(benches, bench_dispatch, bench_build);
criterion_main!(benches);
