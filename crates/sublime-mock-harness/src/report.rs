//! Report generation for drift-check results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diff;
use crate::verify::{DiffEntry, DiffOutcome, VerificationSummary};

/// A drift report: what was compared and how every reference name fared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Report title.
    pub title: String,
    /// Reference namespace label.
    pub reference: String,
    /// Shadow namespace label.
    pub shadow: String,
    /// SHA-256 of the shadow catalog that was verified.
    pub shadow_fingerprint: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    pub summary: VerificationSummary,
    pub entries: Vec<DiffEntry>,
}

impl DriftReport {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        reference: impl Into<String>,
        shadow: impl Into<String>,
        shadow_fingerprint: impl Into<String>,
        entries: Vec<DiffEntry>,
    ) -> Self {
        Self {
            title: title.into(),
            reference: reference.into(),
            shadow: shadow.into(),
            shadow_fingerprint: shadow_fingerprint.into(),
            timestamp: crate::structured_log::now_utc(),
            summary: VerificationSummary::from_entries(&entries),
            entries,
        }
    }

    /// One `<name>: <status>` line per entry.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("{}: {}\n", entry.name, entry.outcome.status()));
        }
        out
    }

    /// The quick presence check: one line per missing name, or a single
    /// all-present line.
    #[must_use]
    pub fn missing_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if let DiffOutcome::Missing { reference_kind } = &entry.outcome {
                out.push_str(&format!(
                    "{} ({reference_kind}) is MISSING in {}!\n",
                    entry.name, self.shadow
                ));
            }
        }
        if out.is_empty() {
            out.push_str(&format!(
                "All attributes in {} are present in {}.\n",
                self.reference, self.shadow
            ));
        }
        out
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Reference: {}\n", self.reference));
        out.push_str(&format!("- Shadow: {}\n", self.shadow));
        out.push_str(&format!("- Shadow fingerprint: `{}`\n", self.shadow_fingerprint));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Matched: {}\n", self.summary.matched));
        out.push_str(&format!("- Mismatched: {}\n", self.summary.mismatched));
        out.push_str(&format!("- Missing: {}\n", self.summary.missing));
        out.push_str(&format!("- Errors: {}\n\n", self.summary.failed));

        out.push_str("| Attribute | Status | Detail |\n");
        out.push_str("|-----------|--------|--------|\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                entry.name,
                entry.outcome.status(),
                detail(entry)
            ));
        }

        let mismatches: Vec<_> = self
            .entries
            .iter()
            .filter_map(|e| match &e.outcome {
                DiffOutcome::Mismatch { reference, shadow } => Some((e, reference, shadow)),
                _ => None,
            })
            .collect();
        if !mismatches.is_empty() {
            out.push_str("\n## Mismatches\n");
            for (entry, reference, shadow) in mismatches {
                out.push_str(&format!("\n### `{}`\n\n```\n", entry.name));
                out.push_str(diff::render_value_diff(reference, shadow).trim_end());
                out.push_str("\n```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Path of the JSON report written beside the markdown report at `path`.
///
/// `report.md` gives `report.json`; a path that already ends in `.json`
/// gives `<stem>.report.json` so the markdown is never overwritten.
#[must_use]
pub fn json_sibling(path: &Path) -> PathBuf {
    let sibling = path.with_extension("json");
    if sibling == path {
        path.with_extension("report.json")
    } else {
        sibling
    }
}

fn detail(entry: &DiffEntry) -> String {
    let text = match &entry.outcome {
        DiffOutcome::Match => entry.note.clone().unwrap_or_default(),
        DiffOutcome::Mismatch { reference, shadow } => {
            format!("reference `{reference}`, shadow `{shadow}`")
        }
        DiffOutcome::Missing { reference_kind } => format!("{reference_kind} absent from shadow"),
        DiffOutcome::Failed { reason } => reason.clone(),
    };
    text.replace('|', "\\|")
}
