//! Runtime configuration.
//!
//! Call tracing is set via the `SUBLIME_MOCK_TRACE` environment variable:
//! - `off` (default): the catalog is built without the trace wrapper. Stub
//!   bodies are the unwrapped originals.
//! - `plain`: every stub call writes `MOCK API: <name>(<n> args)` to the
//!   trace channel before running.
//! - `json`: every stub call writes one JSONL trace record instead.
//!
//! `SUBLIME_MOCK_CLIPBOARD=off` stops `get_clipboard`/`set_clipboard` from
//! delegating to a local clipboard tool.

use std::sync::atomic::{AtomicU8, Ordering};

pub const TRACE_ENV: &str = "SUBLIME_MOCK_TRACE";
pub const CLIPBOARD_ENV: &str = "SUBLIME_MOCK_CLIPBOARD";

/// Call-trace mode for catalog construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceMode {
    #[default]
    Off,
    Plain,
    Json,
}

impl TraceMode {
    /// Parse from string (case-insensitive). Unknown values disable tracing.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "true" | "yes" | "plain" | "text" => Self::Plain,
            "json" | "jsonl" => Self::Json,
            _ => Self::Off,
        }
    }

    #[must_use]
    pub const fn enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Plain => "plain",
            Self::Json => "json",
        }
    }
}

// 0=unresolved, 1=Off, 2=Plain, 3=Json.
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_OFF: u8 = 1;
const MODE_PLAIN: u8 = 2;
const MODE_JSON: u8 = 3;

fn mode_to_u8(mode: TraceMode) -> u8 {
    match mode {
        TraceMode::Off => MODE_OFF,
        TraceMode::Plain => MODE_PLAIN,
        TraceMode::Json => MODE_JSON,
    }
}

fn u8_to_mode(v: u8) -> TraceMode {
    match v {
        MODE_PLAIN => TraceMode::Plain,
        MODE_JSON => TraceMode::Json,
        _ => TraceMode::Off,
    }
}

/// Get the configured trace mode (reads the env var on first call, caches
/// thereafter). The first resolved value wins for the rest of the process.
#[must_use]
pub fn trace_mode() -> TraceMode {
    let cached = CACHED_MODE.load(Ordering::Acquire);
    if cached != MODE_UNRESOLVED {
        return u8_to_mode(cached);
    }

    let mode = std::env::var(TRACE_ENV)
        .map(|v| TraceMode::from_str_loose(&v))
        .unwrap_or_default();
    match CACHED_MODE.compare_exchange(
        MODE_UNRESOLVED,
        mode_to_u8(mode),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => mode,
        Err(existing) => u8_to_mode(existing),
    }
}

/// Whether clipboard delegation is allowed by the environment.
#[must_use]
pub fn clipboard_enabled() -> bool {
    std::env::var(CLIPBOARD_ENV)
        .map(|v| !is_disabled(&v))
        .unwrap_or(true)
}

fn is_disabled(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "off" | "false" | "no" | "none" | "disabled"
    )
}
