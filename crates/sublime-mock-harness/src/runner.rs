//! Drift-check execution engine.

use std::io::Write;

use serde_json::json;
use sublime_mock_api::{Namespace, SurfaceCatalog};

use crate::report::DriftReport;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::{self, DiffEntry, DiffOutcome, VerifyError};

/// Runs a verification of the catalog against a reference and builds the
/// report.
pub struct DriftCheck {
    /// Report title.
    pub title: String,
}

impl DriftCheck {
    /// Create a new drift check.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Verify `shadow` against `reference`.
    pub fn run(
        &self,
        reference: Option<&dyn Namespace>,
        shadow: &SurfaceCatalog,
    ) -> Result<DriftReport, VerifyError> {
        let entries = verify::verify(reference, shadow)?;
        Ok(self.report(reference, shadow, entries))
    }

    /// Like [`DriftCheck::run`], also writing a `verify_start` record, one
    /// `verify_entry` record per entry and a closing `verify_summary` (or
    /// `verify_skipped`) record.
    pub fn run_logged<W: Write>(
        &self,
        reference: Option<&dyn Namespace>,
        shadow: &SurfaceCatalog,
        log: &mut LogEmitter<W>,
    ) -> std::io::Result<Result<DriftReport, VerifyError>> {
        log.emit(LogLevel::Info, "verify_start")?;
        let entries = match verify::verify(reference, shadow) {
            Ok(entries) => entries,
            Err(err) => {
                log.emit_entry(
                    LogEntry::new("", LogLevel::Warn, "verify_skipped")
                        .with_outcome(Outcome::Skip)
                        .with_details(json!({ "reason": err.to_string() })),
                )?;
                log.flush()?;
                return Ok(Err(err));
            }
        };

        for entry in &entries {
            log.emit_entry(entry_record(entry))?;
        }
        let report = self.report(reference, shadow, entries);
        let summary = &report.summary;
        let outcome = if summary.all_matched() {
            Outcome::Pass
        } else {
            Outcome::Fail
        };
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "verify_summary")
                .with_outcome(outcome)
                .with_details(json!({
                    "reference": report.reference,
                    "shadow": report.shadow,
                    "shadow_fingerprint": report.shadow_fingerprint,
                    "total": summary.total,
                    "matched": summary.matched,
                    "mismatched": summary.mismatched,
                    "missing": summary.missing,
                    "failed": summary.failed,
                })),
        )?;
        log.flush()?;
        Ok(Ok(report))
    }

    fn report(
        &self,
        reference: Option<&dyn Namespace>,
        shadow: &SurfaceCatalog,
        entries: Vec<DiffEntry>,
    ) -> DriftReport {
        DriftReport::new(
            self.title.clone(),
            reference.map(|r| r.label().to_string()).unwrap_or_default(),
            shadow.label(),
            shadow.fingerprint(),
            entries,
        )
    }
}

fn entry_record(entry: &DiffEntry) -> LogEntry {
    let (level, outcome) = match entry.outcome {
        DiffOutcome::Match => (LogLevel::Debug, Outcome::Pass),
        DiffOutcome::Mismatch { .. } | DiffOutcome::Missing { .. } => {
            (LogLevel::Warn, Outcome::Fail)
        }
        DiffOutcome::Failed { .. } => (LogLevel::Error, Outcome::Error),
    };
    let mut record = LogEntry::new("", level, "verify_entry")
        .with_symbol(&entry.name)
        .with_outcome(outcome);
    if !entry.is_match() || entry.note.is_some() {
        record = record.with_details(json!({
            "outcome": entry.outcome,
            "note": entry.note,
        }));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{ReferenceSnapshot, SnapshotNamespace};
    use crate::structured_log::validate_log_text;

    fn reference() -> SnapshotNamespace {
        SnapshotNamespace::new(
            ReferenceSnapshot::from_json(
                r#"{
                    "version":"v1",
                    "module":"sublime_api",
                    "attributes":[
                        {"name":"platform","kind":"callable"},
                        {"name":"brand_new_call","kind":"callable"}
                    ]
                }"#,
            )
            .expect("valid snapshot"),
        )
    }

    #[test]
    fn run_builds_report_with_fingerprint() {
        let catalog = SurfaceCatalog::new();
        let reference = reference();
        let report = DriftCheck::new("smoke")
            .run(Some(&reference), &catalog)
            .expect("reference present");
        assert_eq!(report.reference, "sublime_api");
        assert_eq!(report.shadow, "sublime_mock_api");
        assert_eq!(report.shadow_fingerprint, catalog.fingerprint());
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.missing, 1);
    }

    #[test]
    fn logged_run_emits_entry_and_summary_records() {
        let catalog = SurfaceCatalog::new();
        let reference = reference();
        let mut log = LogEmitter::to_buffer("test");
        let report = DriftCheck::new("smoke")
            .run_logged(Some(&reference), &catalog, &mut log)
            .expect("io")
            .expect("reference present");
        assert_eq!(report.summary.total, 2);

        let text = String::from_utf8(log.into_inner()).expect("utf8");
        let (lines, errors) = validate_log_text(&text);
        assert_eq!(lines, 4);
        assert!(errors.is_empty(), "{errors:?}");
        let first = text.lines().next().expect("first line");
        assert!(first.contains("\"event\":\"verify_start\""), "{first}");
        assert!(text.contains("\"event\":\"verify_summary\""));
        assert!(text.contains("\"symbol\":\"brand_new_call\""));
    }

    #[test]
    fn logged_run_records_skip() {
        let catalog = SurfaceCatalog::new();
        let mut log = LogEmitter::to_buffer("test");
        let result = DriftCheck::new("smoke")
            .run_logged(None, &catalog, &mut log)
            .expect("io");
        assert!(matches!(result, Err(VerifyError::ReferenceUnavailable { .. })));
        assert_eq!(log.emitted(), 2);
        let text = String::from_utf8(log.into_inner()).expect("utf8");
        assert!(text.contains("\"outcome\":\"skip\""));
    }
}
