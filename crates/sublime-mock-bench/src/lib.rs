//! Benchmarks for the sublime_api stand-in. See `benches/`.
