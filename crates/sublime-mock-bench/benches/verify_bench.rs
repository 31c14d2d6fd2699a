//! Verification run benchmarks.
//!
//! Measures a full drift check of the catalog against a snapshot of
//! itself, and snapshot loading.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sublime_mock_api::SurfaceCatalog;
use sublime_mock_harness::{DriftCheck, ReferenceSnapshot, SnapshotNamespace, verify};

fn self_reference(catalog: &SurfaceCatalog) -> SnapshotNamespace {
    SnapshotNamespace::new(ReferenceSnapshot::capture(catalog, "bench").expect("capture"))
}

fn bench_verify(c: &mut Criterion) {
    let catalog = SurfaceCatalog::new();
    let reference = self_reference(&catalog);
    c.bench_function("verify_self", |b| {
        b.iter(|| {
            black_box(verify(Some(&reference), &catalog).expect("verify"));
        });
    });
}

fn bench_drift_report(c: &mut Criterion) {
    let catalog = SurfaceCatalog::new();
    let reference = self_reference(&catalog);
    let check = DriftCheck::new("bench");
    c.bench_function("drift_report_text", |b| {
        b.iter(|| {
            let report = check.run(Some(&reference), &catalog).expect("verify");
            black_box(report.to_text());
        });
    });
}

fn bench_snapshot_parse(c: &mut Criterion) {
    let catalog = SurfaceCatalog::new();
    let json = ReferenceSnapshot::capture(&catalog, "bench")
        .expect("capture")
        .to_json()
        .expect("serialize");
    c.bench_function("snapshot_parse", |b| {
        b.iter(|| {
            black_box(ReferenceSnapshot::from_json(black_box(&json)).expect("parse"));
        });
    });
}

criterion_group!(benches, bench_verify, bench_drift_report, bench_snapshot_parse);
criterion_main!(benches);
