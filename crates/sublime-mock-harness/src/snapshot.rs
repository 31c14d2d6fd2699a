//! Reference snapshots: a host namespace recorded as JSON.
//!
//! The real `sublime_api` only exists inside the editor's plugin host, so
//! the verifier reads a snapshot of it instead. Attribute order in the file
//! is the enumeration order.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sublime_mock_api::{Attribute, LookupError, Namespace, Param, Signature};

use crate::verify::VerifyError;

/// Schema version written and accepted by this crate.
pub const SNAPSHOT_VERSION: &str = "v1";

/// One recorded attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SnapshotAttribute {
    Value {
        name: String,
        value: Value,
    },
    Callable {
        name: String,
        /// Absent when the host exposes no signature.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Vec<Param>>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        variadic: bool,
    },
}

impl SnapshotAttribute {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Value { name, .. } | Self::Callable { name, .. } => name,
        }
    }

    #[must_use]
    pub fn to_attribute(&self) -> Attribute {
        match self {
            Self::Value { value, .. } => Attribute::Value(value.clone()),
            Self::Callable {
                name,
                params,
                variadic,
            } => {
                let signature = match (params, variadic) {
                    (None, false) => None,
                    (params, variadic) => Some(Signature {
                        params: params.clone().unwrap_or_default(),
                        variadic: *variadic,
                    }),
                };
                Attribute::callable(name.clone(), signature)
            }
        }
    }

    fn from_attribute(name: &str, attribute: Attribute) -> Self {
        match attribute {
            Attribute::Value(value) => Self::Value {
                name: name.to_string(),
                value,
            },
            Attribute::Callable { signature, .. } => {
                let variadic = signature.as_ref().is_some_and(|s| s.variadic);
                Self::Callable {
                    name: name.to_string(),
                    params: signature.map(|s| s.params),
                    variadic,
                }
            }
        }
    }
}

/// Errors reading or validating a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported snapshot version `{0}` (expected `{SNAPSHOT_VERSION}`)")]
    UnsupportedVersion(String),
    #[error("attribute `{0}` appears more than once")]
    DuplicateAttribute(String),
    #[error("failed to capture namespace: {0}")]
    Capture(#[from] LookupError),
}

/// A recorded namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    /// Schema version.
    pub version: String,
    /// Module name, e.g. `sublime_api`.
    pub module: String,
    /// Host build the snapshot was taken from.
    #[serde(default)]
    pub host: String,
    /// UTC timestamp of capture.
    #[serde(default)]
    pub captured_at: String,
    pub attributes: Vec<SnapshotAttribute>,
}

impl ReferenceSnapshot {
    /// Load and validate a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load and validate a snapshot from a file path.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Record every attribute of `namespace`.
    pub fn capture(namespace: &dyn Namespace, host: impl Into<String>) -> Result<Self, SnapshotError> {
        let mut attributes = Vec::new();
        for name in namespace.attribute_names() {
            if let Some(attribute) = namespace.attribute(&name)? {
                attributes.push(SnapshotAttribute::from_attribute(&name, attribute));
            }
        }
        Ok(Self {
            version: SNAPSHOT_VERSION.to_string(),
            module: namespace.label().to_string(),
            host: host.into(),
            captured_at: crate::structured_log::now_utc(),
            attributes,
        })
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version.clone()));
        }
        let mut seen = std::collections::HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name()) {
                return Err(SnapshotError::DuplicateAttribute(attribute.name().to_string()));
            }
        }
        Ok(())
    }
}

/// A snapshot exposed through [`Namespace`].
#[derive(Debug, Clone)]
pub struct SnapshotNamespace {
    snapshot: ReferenceSnapshot,
    index: HashMap<String, usize>,
}

impl SnapshotNamespace {
    #[must_use]
    pub fn new(snapshot: ReferenceSnapshot) -> Self {
        let index = snapshot
            .attributes
            .iter()
            .enumerate()
            .map(|(i, attribute)| (attribute.name().to_string(), i))
            .collect();
        Self { snapshot, index }
    }

    #[must_use]
    pub fn snapshot(&self) -> &ReferenceSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.attributes.is_empty()
    }
}

impl From<ReferenceSnapshot> for SnapshotNamespace {
    fn from(snapshot: ReferenceSnapshot) -> Self {
        Self::new(snapshot)
    }
}

impl Namespace for SnapshotNamespace {
    fn label(&self) -> &str {
        &self.snapshot.module
    }

    fn attribute_names(&self) -> Vec<String> {
        self.snapshot
            .attributes
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    fn attribute(&self, name: &str) -> Result<Option<Attribute>, LookupError> {
        Ok(self
            .index
            .get(name)
            .map(|&i| self.snapshot.attributes[i].to_attribute()))
    }
}

/// Load the reference namespace. Any failure means there is no reference
/// to verify against.
pub fn load_reference(path: &Path) -> Result<SnapshotNamespace, VerifyError> {
    ReferenceSnapshot::from_file(path)
        .map(SnapshotNamespace::new)
        .map_err(|err| VerifyError::ReferenceUnavailable {
            reason: format!("{}: {err}", path.display()),
        })
}
