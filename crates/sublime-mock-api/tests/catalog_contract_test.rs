//! Integration test: surface catalog contract
//!
//! Validates that:
//! 1. Every host callable listed in the parameter fixture exists in the catalog.
//! 2. Each one declares the same positional parameter names, in order.
//! 3. Every stub is total: a call with null for each declared parameter succeeds.
//! 4. Tracing changes neither results, signatures nor printed output.
//! 5. The module marker value is exposed.
//!
//! Run: cargo test -p sublime-mock-api --test catalog_contract_test

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Value, json};
use sublime_mock_api::{
    Arg, Attribute, CatalogBuilder, HostContext, Namespace, SurfaceCatalog, TraceMode,
};

fn load_parameters() -> Vec<(String, Vec<String>)> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/host_parameters.json");
    let content = std::fs::read_to_string(&path).expect("host_parameters.json should exist");
    let doc: Value =
        serde_json::from_str(&content).expect("host_parameters.json should be valid JSON");
    doc["callables"]
        .as_array()
        .expect("callables should be an array")
        .iter()
        .map(|c| {
            let name = c["name"].as_str().expect("name").to_string();
            let params = c["params"]
                .as_array()
                .expect("params")
                .iter()
                .map(|p| p.as_str().expect("param name").to_string())
                .collect();
            (name, params)
        })
        .collect()
}

fn null_args(catalog: &SurfaceCatalog, name: &str) -> Vec<Arg> {
    let sig = catalog
        .entry(name)
        .and_then(|e| e.signature())
        .expect("callable entry");
    (0..sig.arity()).map(|_| Arg::from(Value::Null)).collect()
}

#[test]
fn fixture_covers_the_host_surface() {
    let params = load_parameters();
    assert!(params.len() > 200, "fixture looks truncated: {}", params.len());
    let unique: HashSet<_> = params.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(unique.len(), params.len(), "duplicate names in fixture");
}

#[test]
fn every_host_callable_is_present() {
    let catalog = SurfaceCatalog::new();
    let missing: Vec<_> = load_parameters()
        .into_iter()
        .filter(|(name, _)| !catalog.entry(name).is_some_and(|e| e.is_callable()))
        .map(|(name, _)| name)
        .collect();
    assert!(missing.is_empty(), "missing callables: {missing:?}");
}

#[test]
fn parameter_names_match_host() {
    let catalog = SurfaceCatalog::new();
    let mut mismatched = Vec::new();
    for (name, expected) in load_parameters() {
        let Some(sig) = catalog.entry(&name).and_then(|e| e.signature()) else {
            continue;
        };
        let actual: Vec<&str> = sig.names().collect();
        if actual != expected {
            mismatched.push(format!("{name}: expected {expected:?}, got {actual:?}"));
        }
    }
    assert!(mismatched.is_empty(), "{}", mismatched.join("\n"));
}

#[test]
fn every_stub_is_total_with_null_arguments() {
    let catalog = SurfaceCatalog::new();
    let (ctx, _console) = HostContext::detached();
    for entry in catalog.entries().filter(|e| e.is_callable()) {
        let args = null_args(&catalog, entry.name());
        let result = catalog.call(entry.name(), args, &ctx);
        assert!(result.is_ok(), "{} failed: {:?}", entry.name(), result.err());
    }
}

#[test]
fn tracing_is_transparent() {
    let plain = SurfaceCatalog::new();
    let traced = CatalogBuilder::new().trace(TraceMode::Plain).build();

    assert_eq!(plain.attribute_names(), traced.attribute_names());
    for name in plain.attribute_names() {
        assert_eq!(
            plain.attribute(&name).expect("lookup"),
            traced.attribute(&name).expect("lookup"),
            "attribute {name} changed under tracing"
        );
    }

    let (plain_ctx, plain_console) = HostContext::detached();
    let (traced_ctx, traced_console) = HostContext::detached();
    for entry in plain.entries().filter(|e| e.is_callable()) {
        let a = plain.call(entry.name(), null_args(&plain, entry.name()), &plain_ctx);
        let b = traced.call(entry.name(), null_args(&traced, entry.name()), &traced_ctx);
        assert_eq!(a.ok(), b.ok(), "{} result changed under tracing", entry.name());
    }
    assert_eq!(plain_console.out_lines(), traced_console.out_lines());
    assert_eq!(plain_console.err_lines(), traced_console.err_lines());
    assert!(plain_console.trace_lines().is_empty());
    assert_eq!(
        traced_console.trace_lines().len(),
        plain.entries().filter(|e| e.is_callable()).count()
    );
}

#[test]
fn module_marker_is_exposed() {
    let catalog = SurfaceCatalog::new();
    assert_eq!(
        catalog.attribute("THIS_IS_THE_MOCKED_MODULE").expect("lookup"),
        Some(Attribute::Value(json!(true)))
    );
}

#[test]
fn placeholder_handles_are_consistent() {
    let catalog = SurfaceCatalog::new();
    let (ctx, _console) = HostContext::detached();
    let window = catalog.call("active_window", vec![], &ctx).expect("call");
    let windows = catalog.call("windows", vec![], &ctx).expect("call");
    assert_eq!(windows, json!([window]));
    assert_eq!(
        catalog.call("version", vec![], &ctx).expect("call"),
        json!(sublime_mock_api::MOCK_VERSION)
    );
}
