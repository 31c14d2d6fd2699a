//! Attributes and the namespace seam.
//!
//! Both sides of a drift check (the host's reference module and this
//! crate's catalog) are read through [`Namespace`]. Host callables carry no
//! introspectable signature, so [`Attribute::Callable`] keeps its signature
//! optional.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared parameter: its name and whether a default exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub has_default: bool,
}

impl Param {
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_default: false,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_default: true,
        }
    }
}

/// Ordered parameter shape of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Param>,
    /// Accepts arbitrary extra arguments past `params`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
}

impl Signature {
    #[must_use]
    pub fn new(params: Vec<Param>) -> Self {
        Self {
            params,
            variadic: false,
        }
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Number of parameters without a default.
    #[must_use]
    pub fn required(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for param in &self.params {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(&param.name)?;
            if param.has_default {
                f.write_str("=...")?;
            }
        }
        if self.variadic {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str("**args")?;
        }
        Ok(())
    }
}

/// Whether an attribute is a function or a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Callable,
    Value,
}

impl AttributeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Callable => "callable",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entry exposed by a namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// A function. `signature` is `None` when the owner cannot describe it.
    Callable {
        name: String,
        signature: Option<Signature>,
    },
    /// A directly comparable value.
    Value(Value),
}

impl Attribute {
    #[must_use]
    pub fn callable(name: impl Into<String>, signature: Option<Signature>) -> Self {
        Self::Callable {
            name: name.into(),
            signature,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Callable { .. } => AttributeKind::Callable,
            Self::Value(_) => AttributeKind::Value,
        }
    }

    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Callable { .. })
    }

    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Callable { signature, .. } => signature.as_ref(),
            Self::Value(_) => None,
        }
    }

    /// Value used when this attribute appears in a mismatch report.
    /// Callables render as `<callable name>`.
    #[must_use]
    pub fn report_value(&self) -> Value {
        match self {
            Self::Callable { name, .. } => Value::String(format!("<callable {name}>")),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Failure to read a single attribute. Never fatal to a whole scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("attribute `{name}` could not be read: {reason}")]
    Unreadable { name: String, reason: String },
}

/// An enumerable collection of named attributes.
pub trait Namespace {
    /// Short name used in reports (e.g. `sublime_api`).
    fn label(&self) -> &str;

    /// Attribute names in the namespace's natural order.
    fn attribute_names(&self) -> Vec<String>;

    /// Look up one attribute. `Ok(None)` means the name is absent.
    fn attribute(&self, name: &str) -> Result<Option<Attribute>, LookupError>;
}
