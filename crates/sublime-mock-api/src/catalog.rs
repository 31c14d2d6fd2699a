//! The surface catalog: the shadow namespace built from the stub table.
//!
//! [`CatalogBuilder::build`] turns every [`StubSpec`] into a callable body
//! and applies the call-trace wrapper in one place. The declared signature
//! is stored beside the body, so wrapping never changes what
//! [`Namespace::attribute`] reports.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::attribute::{Attribute, LookupError, Namespace, Signature};
use crate::codec::ExpandError;
use crate::config::{self, TraceMode};
use crate::context::HostContext;
use crate::surface::{self, StubSpec, ValueSpec};
use crate::trace;

/// Label the catalog reports through [`Namespace::label`].
pub const CATALOG_LABEL: &str = "sublime_mock_api";

/// Callback argument, e.g. the `f` passed to `set_timeout`.
pub type Callback = Arc<dyn Fn() -> Value + Send + Sync>;

/// One positional argument to a stub.
#[derive(Clone)]
pub enum Arg {
    Value(Value),
    Callback(Callback),
}

impl Arg {
    #[must_use]
    pub fn callback(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Callback(_) => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A bound call: arguments already padded with declared defaults.
pub struct Invocation<'a> {
    name: &'a str,
    args: Vec<Arg>,
    given: usize,
    ctx: &'a HostContext,
}

impl<'a> Invocation<'a> {
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    #[must_use]
    pub fn ctx(&self) -> &'a HostContext {
        self.ctx
    }

    /// Bound arguments, defaults included.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Number of arguments the caller actually passed.
    #[must_use]
    pub fn given(&self) -> usize {
        self.given
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    /// Argument `index` as a value. Callbacks and absent arguments read as null.
    #[must_use]
    pub fn value(&self, index: usize) -> Value {
        self.arg(index)
            .and_then(Arg::as_value)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

pub type StubResult = Result<Value, StubError>;

/// Callable body of a catalog stub.
pub type StubFn = Arc<dyn Fn(&Invocation<'_>) -> StubResult + Send + Sync>;

/// Box a closure or function as a [`StubFn`].
pub fn stub_fn<F>(f: F) -> StubFn
where
    F: Fn(&Invocation<'_>) -> StubResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Errors a catalog call can produce.
///
/// Only shape-nonconforming calls and `expand_variables` fail; every other
/// stub is total.
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    #[error("no attribute named `{0}` in the surface catalog")]
    UnknownStub(String),
    #[error("`{0}` is a value, not a callable")]
    NotCallable(String),
    #[error("{name}() takes {expected} but {given} were given")]
    ArityMismatch {
        name: String,
        expected: String,
        given: usize,
    },
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

enum EntryItem {
    Stub {
        spec: &'static StubSpec,
        signature: Signature,
        body: StubFn,
    },
    Value(Value),
}

/// One named entry of the catalog.
pub struct CatalogEntry {
    name: &'static str,
    item: EntryItem,
}

impl CatalogEntry {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self.item, EntryItem::Stub { .. })
    }

    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        match &self.item {
            EntryItem::Stub { signature, .. } => Some(signature),
            EntryItem::Value(_) => None,
        }
    }

    /// The stub body as built, wrapper included.
    #[must_use]
    pub fn body(&self) -> Option<&StubFn> {
        match &self.item {
            EntryItem::Stub { body, .. } => Some(body),
            EntryItem::Value(_) => None,
        }
    }

    #[must_use]
    pub fn attribute(&self) -> Attribute {
        match &self.item {
            EntryItem::Stub { signature, .. } => {
                Attribute::callable(self.name, Some(signature.clone()))
            }
            EntryItem::Value(value) => Attribute::Value(value.clone()),
        }
    }

    /// Canonical one-line rendering, e.g. `ok_cancel_dialog(msg, ok_title='')`.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.item {
            EntryItem::Stub { spec, .. } => spec.render(),
            EntryItem::Value(value) => format!("{} = {value}", self.name),
        }
    }
}

/// Builds a [`SurfaceCatalog`], applying call tracing uniformly.
#[derive(Debug, Clone, Copy)]
pub struct CatalogBuilder {
    trace: TraceMode,
    stubs: &'static [StubSpec],
    values: &'static [ValueSpec],
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    /// Builder over the full host surface with tracing off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trace: TraceMode::Off,
            stubs: surface::STUBS,
            values: surface::VALUES,
        }
    }

    #[must_use]
    pub fn trace(mut self, mode: TraceMode) -> Self {
        self.trace = mode;
        self
    }

    /// Replace the stub and value tables.
    #[must_use]
    pub fn surface(mut self, stubs: &'static [StubSpec], values: &'static [ValueSpec]) -> Self {
        self.stubs = stubs;
        self.values = values;
        self
    }

    #[must_use]
    pub fn build(self) -> SurfaceCatalog {
        let mut entries = Vec::with_capacity(self.values.len() + self.stubs.len());

        for spec in self.values {
            entries.push(CatalogEntry {
                name: spec.name,
                item: EntryItem::Value(spec.value.to_value()),
            });
        }
        for spec in self.stubs {
            let body = trace::wrap(spec.name, spec.body.to_stub_fn(), self.trace);
            entries.push(CatalogEntry {
                name: spec.name,
                item: EntryItem::Stub {
                    spec,
                    signature: spec.signature(),
                    body,
                },
            });
        }

        // Later entries shadow earlier ones with the same name.
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name, i))
            .collect();

        SurfaceCatalog {
            entries,
            index,
            trace: self.trace,
        }
    }
}

/// The shadow namespace: every stub and value the stand-in exposes.
pub struct SurfaceCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<&'static str, usize>,
    trace: TraceMode,
}

impl SurfaceCatalog {
    /// Full surface with tracing off.
    #[must_use]
    pub fn new() -> Self {
        CatalogBuilder::new().build()
    }

    /// Full surface with the trace mode taken from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        CatalogBuilder::new().trace(config::trace_mode()).build()
    }

    #[must_use]
    pub fn trace_mode(&self) -> TraceMode {
        self.trace
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Call stub `name` with positional `args`.
    ///
    /// Missing trailing arguments take their declared defaults. Too many
    /// arguments (for a non-variadic stub) or a missing required argument is
    /// a [`StubError::ArityMismatch`].
    pub fn call(&self, name: &str, args: Vec<Arg>, ctx: &HostContext) -> StubResult {
        let entry = self
            .entry(name)
            .ok_or_else(|| StubError::UnknownStub(name.to_string()))?;
        let EntryItem::Stub { spec, body, .. } = &entry.item else {
            return Err(StubError::NotCallable(name.to_string()));
        };

        let given = args.len();
        let args = bind_args(spec, args)?;
        let invocation = Invocation {
            name: spec.name,
            args,
            given,
            ctx,
        };
        body(&invocation)
    }

    /// SHA-256 over the rendered entries, in catalog order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.render().as_bytes());
            hasher.update(b"\n");
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl Default for SurfaceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SurfaceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceCatalog")
            .field("entries", &self.entries.len())
            .field("trace", &self.trace)
            .finish()
    }
}

impl Namespace for SurfaceCatalog {
    fn label(&self) -> &str {
        CATALOG_LABEL
    }

    fn attribute_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.to_string()).collect()
    }

    fn attribute(&self, name: &str) -> Result<Option<Attribute>, LookupError> {
        Ok(self.entry(name).map(CatalogEntry::attribute))
    }
}

fn bind_args(spec: &StubSpec, mut args: Vec<Arg>) -> Result<Vec<Arg>, StubError> {
    let given = args.len();
    let declared = spec.params.len();
    if given > declared && !spec.variadic {
        return Err(arity_mismatch(spec, given));
    }
    for param in spec.params.iter().skip(given) {
        match &param.default {
            Some(default) => args.push(Arg::Value(default.to_value())),
            None => return Err(arity_mismatch(spec, given)),
        }
    }
    Ok(args)
}

fn arity_mismatch(spec: &StubSpec, given: usize) -> StubError {
    let declared = spec.params.len();
    let required = spec.params.iter().filter(|p| p.default.is_none()).count();
    let expected = if spec.variadic {
        format!("at least {required} positional arguments")
    } else if required == declared {
        format!("{declared} positional arguments")
    } else {
        format!("from {required} to {declared} positional arguments")
    };
    StubError::ArityMismatch {
        name: spec.name.to_string(),
        expected,
        given,
    }
}
