//! Stand-in for the `sublime_api` surface that Sublime Text only provides
//! inside its plugin host.
//!
//! This crate provides:
//! - Surface catalog: one stub per host attribute, generated from a static table
//! - Call tracing: an optional wrapper applied once when the catalog is built
//! - Host context: the logging toggles, console channels and clipboard access
//!   that stubs are allowed to touch
//! - Value helpers: `encode_value`, `decode_value` and `expand_variables`
//!
//! The catalog implements [`Namespace`], the same seam reference snapshots of
//! the real host implement, so the two can be diffed by the harness.

#![forbid(unsafe_code)]

pub mod attribute;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod context;
pub mod stubs;
pub mod surface;
pub mod trace;

pub use attribute::{Attribute, AttributeKind, LookupError, Namespace, Param, Signature};
pub use catalog::{
    Arg, CatalogBuilder, Invocation, StubError, StubFn, StubResult, SurfaceCatalog, stub_fn,
};
pub use codec::{ExpandError, decode_value, encode_value, expand_variables};
pub use config::{TraceMode, trace_mode};
pub use context::{BufferConsole, Clipboard, Console, HostContext, LogFlags};

/// Placeholder identity returned by stubs that stand in for window, view,
/// sheet and settings handles. It is not a real host id.
pub const PLACEHOLDER_ID: i64 = 1;

/// Version string the shadow reports for `version()`.
pub const MOCK_VERSION: &str = "3207";
