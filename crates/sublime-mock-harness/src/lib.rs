//! Drift detection between the `sublime_api` host surface and its stand-in.
//!
//! This crate provides:
//! - Reference snapshots: the host namespace recorded as JSON and read back
//!   through the same [`Namespace`](sublime_mock_api::Namespace) seam the
//!   catalog implements
//! - Verification: reference-driven, per-attribute classification
//! - Report generation: text, markdown and machine-readable JSON
//! - Structured logging: JSONL records for every verification entry

#![forbid(unsafe_code)]

pub mod diff;
pub mod report;
pub mod runner;
pub mod snapshot;
pub mod structured_log;
pub mod verify;

pub use report::DriftReport;
pub use runner::DriftCheck;
pub use snapshot::{ReferenceSnapshot, SnapshotNamespace, load_reference};
pub use verify::{DiffEntry, DiffOutcome, VerificationSummary, VerifyError, has_missing, verify};
