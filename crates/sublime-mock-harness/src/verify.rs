//! Reference-driven comparison of two namespaces.
//!
//! Every name the reference lists becomes exactly one [`DiffEntry`], in the
//! reference's enumeration order. Names only the shadow has are never
//! reported. A failed lookup on either side marks that one entry and the
//! scan continues.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sublime_mock_api::{Attribute, AttributeKind, Namespace, Signature};

/// Run-level failure. Everything else is recorded per entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Verification was skipped, not failed.
    #[error("reference namespace unavailable: {reason}")]
    ReferenceUnavailable { reason: String },
}

/// Classification of one reference attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiffOutcome {
    Match,
    Mismatch { reference: Value, shadow: Value },
    Missing { reference_kind: AttributeKind },
    /// The attribute could not be read on one side.
    Failed { reason: String },
}

impl DiffOutcome {
    /// Status word used in text reports.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Match => "Matches",
            Self::Mismatch { .. } => "MISMATCH!",
            Self::Missing { .. } => "MISSING",
            Self::Failed { .. } => "ERROR",
        }
    }
}

/// Result for one reference attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub name: String,
    pub outcome: DiffOutcome,
    /// Informational only, e.g. differing declared arity on a `Match`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DiffEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: DiffOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            note: None,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self.outcome, DiffOutcome::Match)
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self.outcome, DiffOutcome::Missing { .. })
    }
}

/// Compare `shadow` against `reference`.
///
/// Callables match any shadow callable: the host exposes no reliable
/// parameter metadata, so arity is never grounds for a mismatch. When both
/// sides do declare a signature and the arities differ, the entry carries a
/// note.
pub fn verify(
    reference: Option<&dyn Namespace>,
    shadow: &dyn Namespace,
) -> Result<Vec<DiffEntry>, VerifyError> {
    let reference = reference.ok_or_else(|| VerifyError::ReferenceUnavailable {
        reason: String::from("no reference namespace loaded"),
    })?;
    Ok(reference
        .attribute_names()
        .into_iter()
        .map(|name| classify(reference, shadow, name))
        .collect())
}

fn classify(reference: &dyn Namespace, shadow: &dyn Namespace, name: String) -> DiffEntry {
    let reference_attr = match reference.attribute(&name) {
        Ok(Some(attribute)) => attribute,
        Ok(None) => {
            let reason = format!("listed by {} but not readable", reference.label());
            return DiffEntry::new(name, DiffOutcome::Failed { reason });
        }
        Err(err) => {
            let reason = format!("{}: {err}", reference.label());
            return DiffEntry::new(name, DiffOutcome::Failed { reason });
        }
    };
    let shadow_attr = match shadow.attribute(&name) {
        Ok(Some(attribute)) => attribute,
        Ok(None) => {
            let reference_kind = reference_attr.kind();
            return DiffEntry::new(name, DiffOutcome::Missing { reference_kind });
        }
        Err(err) => {
            let reason = format!("{}: {err}", shadow.label());
            return DiffEntry::new(name, DiffOutcome::Failed { reason });
        }
    };

    match (&reference_attr, &shadow_attr) {
        (Attribute::Callable { .. }, Attribute::Callable { .. }) => DiffEntry {
            note: arity_note(reference_attr.signature(), shadow_attr.signature()),
            ..DiffEntry::new(name, DiffOutcome::Match)
        },
        (Attribute::Value(a), Attribute::Value(b)) if a == b => {
            DiffEntry::new(name, DiffOutcome::Match)
        }
        _ => DiffEntry::new(
            name,
            DiffOutcome::Mismatch {
                reference: reference_attr.report_value(),
                shadow: shadow_attr.report_value(),
            },
        ),
    }
}

fn arity_note(reference: Option<&Signature>, shadow: Option<&Signature>) -> Option<String> {
    let (reference, shadow) = (reference?, shadow?);
    (reference.arity() != shadow.arity() || reference.variadic != shadow.variadic).then(|| {
        format!("reference declares ({reference}), shadow declares ({shadow})")
    })
}

/// Whether any reference attribute is absent from the shadow.
#[must_use]
pub fn has_missing(entries: &[DiffEntry]) -> bool {
    entries.iter().any(DiffEntry::is_missing)
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Reference attributes examined.
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
    /// Entries whose lookup failed.
    pub failed: usize,
}

impl VerificationSummary {
    /// Build a summary from a list of entries.
    #[must_use]
    pub fn from_entries(entries: &[DiffEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match entry.outcome {
                DiffOutcome::Match => summary.matched += 1,
                DiffOutcome::Mismatch { .. } => summary.mismatched += 1,
                DiffOutcome::Missing { .. } => summary.missing += 1,
                DiffOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Returns true if no reference attribute is missing.
    #[must_use]
    pub fn all_present(&self) -> bool {
        self.missing == 0
    }

    /// Returns true if every entry matched.
    #[must_use]
    pub fn all_matched(&self) -> bool {
        self.matched == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sublime_mock_api::{LookupError, Param};

    struct MapNamespace {
        label: &'static str,
        attrs: Vec<(&'static str, Attribute)>,
        broken: Option<&'static str>,
    }

    impl MapNamespace {
        fn new(label: &'static str, attrs: Vec<(&'static str, Attribute)>) -> Self {
            Self {
                label,
                attrs,
                broken: None,
            }
        }
    }

    impl Namespace for MapNamespace {
        fn label(&self) -> &str {
            self.label
        }

        fn attribute_names(&self) -> Vec<String> {
            self.attrs.iter().map(|(n, _)| (*n).to_string()).collect()
        }

        fn attribute(&self, name: &str) -> Result<Option<Attribute>, LookupError> {
            if self.broken == Some(name) {
                return Err(LookupError::Unreadable {
                    name: name.to_string(),
                    reason: String::from("boom"),
                });
            }
            Ok(self
                .attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, a)| a.clone()))
        }
    }

    fn callable(name: &str, params: &[&str]) -> Attribute {
        Attribute::callable(
            name,
            Some(Signature::new(params.iter().map(|p| Param::required(*p)).collect())),
        )
    }

    #[test]
    fn one_entry_per_reference_name_in_order() {
        let reference = MapNamespace::new(
            "ref",
            vec![
                ("b", Attribute::Value(json!(1))),
                ("a", callable("a", &[])),
                ("c", Attribute::Value(json!("x"))),
            ],
        );
        let shadow = MapNamespace::new(
            "shadow",
            vec![("a", callable("a", &[])), ("extra", Attribute::Value(json!(0)))],
        );
        let entries = verify(Some(&reference), &shadow).expect("verify");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(has_missing(&entries));
    }

    #[test]
    fn callable_arity_difference_is_match_with_note() {
        let reference = MapNamespace::new("ref", vec![("f", callable("f", &["x", "y"]))]);
        let shadow = MapNamespace::new("shadow", vec![("f", callable("f", &["x"]))]);
        let entries = verify(Some(&reference), &shadow).expect("verify");
        assert!(entries[0].is_match());
        let note = entries[0].note.as_deref().expect("note");
        assert!(note.contains("x, y"), "{note}");
    }

    #[test]
    fn unknown_reference_signature_has_no_note() {
        let reference =
            MapNamespace::new("ref", vec![("f", Attribute::callable("f", None))]);
        let shadow = MapNamespace::new("shadow", vec![("f", callable("f", &["x"]))]);
        let entries = verify(Some(&reference), &shadow).expect("verify");
        assert_eq!(entries[0].outcome, DiffOutcome::Match);
        assert_eq!(entries[0].note, None);
    }

    #[test]
    fn kind_disagreement_is_mismatch() {
        let reference = MapNamespace::new("ref", vec![("v", Attribute::Value(json!(3)))]);
        let shadow = MapNamespace::new("shadow", vec![("v", callable("v", &[]))]);
        let entries = verify(Some(&reference), &shadow).expect("verify");
        assert_eq!(
            entries[0].outcome,
            DiffOutcome::Mismatch {
                reference: json!(3),
                shadow: json!("<callable v>"),
            }
        );
    }

    #[test]
    fn lookup_failure_marks_one_entry_only() {
        let reference = MapNamespace::new(
            "ref",
            vec![
                ("a", Attribute::Value(json!(1))),
                ("b", Attribute::Value(json!(2))),
            ],
        );
        let mut shadow = MapNamespace::new(
            "shadow",
            vec![
                ("a", Attribute::Value(json!(1))),
                ("b", Attribute::Value(json!(2))),
            ],
        );
        shadow.broken = Some("a");
        let entries = verify(Some(&reference), &shadow).expect("verify");
        assert!(matches!(entries[0].outcome, DiffOutcome::Failed { .. }));
        assert_eq!(entries[1].outcome, DiffOutcome::Match);

        let summary = VerificationSummary::from_entries(&entries);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.matched, 1);
        assert!(summary.all_present());
        assert!(!summary.all_matched());
    }

    #[test]
    fn no_reference_is_unavailable() {
        let shadow = MapNamespace::new("shadow", vec![]);
        let err = verify(None, &shadow).unwrap_err();
        assert!(matches!(err, VerifyError::ReferenceUnavailable { .. }));
    }

    #[test]
    fn status_words() {
        assert_eq!(DiffOutcome::Match.status(), "Matches");
        assert_eq!(
            DiffOutcome::Missing {
                reference_kind: AttributeKind::Value
            }
            .status(),
            "MISSING"
        );
        assert_eq!(
            DiffOutcome::Failed {
                reason: String::new()
            }
            .status(),
            "ERROR"
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let entry = DiffEntry::new(
            "version",
            DiffOutcome::Mismatch {
                reference: json!("4000"),
                shadow: json!("3207"),
            },
        );
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["outcome"]["status"], "mismatch");
        assert_eq!(json["outcome"]["reference"], "4000");
        assert!(json.get("note").is_none());
    }
}
