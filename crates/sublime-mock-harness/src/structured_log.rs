//! Structured logging for drift-check runs.
//!
//! Provides:
//! - [`LogEntry`]: JSONL log record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or an in-memory buffer.
//! - [`validate_log_line`]: validates a single JSONL line against the schema.
//! - [`validate_log_file`]: validates an entire JSONL file.
//!
//! The stand-in's `json` trace mode writes `stub_call` records in this
//! same shape, so one validator covers both streams.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

pub use sublime_mock_api::trace::now_utc;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Per-record verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

/// Structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    /// Attribute or stub name the record is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            symbol: None,
            outcome: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// JSONL writer that assigns `<run_id>::<seq>` trace ids.
pub struct LogEmitter<W: Write> {
    writer: W,
    seq: u64,
    run_id: String,
}

impl LogEmitter<std::io::BufWriter<std::fs::File>> {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file), run_id))
    }
}

impl LogEmitter<Vec<u8>> {
    /// Create an emitter that writes to a `Vec<u8>` buffer (for testing).
    #[must_use]
    pub fn to_buffer(run_id: &str) -> Self {
        Self::new(Vec::new(), run_id)
    }
}

impl<W: Write> LogEmitter<W> {
    #[must_use]
    pub fn new(writer: W, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("sublime-mock::{}::{:03}", self.run_id, self.seq)
    }

    /// Emit a log entry with an auto-generated trace_id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let trace_id = self.next_trace_id();
        let entry = LogEntry::new(&trace_id, level, event);
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        Ok(entry)
    }

    /// Emit a fully-populated log entry. An empty `trace_id` is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Number of records emitted with generated trace ids.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            errors.push(LogValidationError {
                line_number,
                field: "<json>".to_string(),
                message: format!("invalid JSON: {e}"),
            });
            return Err(errors);
        }
    };

    let Some(obj) = value.as_object() else {
        errors.push(LogValidationError {
            line_number,
            field: "<root>".to_string(),
            message: "expected JSON object".to_string(),
        });
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(LogValidationError {
                line_number,
                field: field.to_string(),
                message: "required field missing".to_string(),
            });
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["trace", "debug", "info", "warn", "error"].contains(&level)
    {
        errors.push(LogValidationError {
            line_number,
            field: "level".to_string(),
            message: format!("invalid level: '{level}'"),
        });
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !["pass", "fail", "skip", "error"].contains(&outcome)
    {
        errors.push(LogValidationError {
            line_number,
            field: "outcome".to_string(),
            message: format!("invalid outcome: '{outcome}'"),
        });
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && !is_well_formed_trace_id(trace_id)
    {
        errors.push(LogValidationError {
            line_number,
            field: "trace_id".to_string(),
            message: format!("trace_id should follow <source>::<run>::<seq>, got: '{trace_id}'"),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match serde_json::from_value::<LogEntry>(value) {
        Ok(entry) => Ok(entry),
        Err(e) => {
            errors.push(LogValidationError {
                line_number,
                field: "<deserialization>".to_string(),
                message: format!("failed to deserialize: {e}"),
            });
            Err(errors)
        }
    }
}

// `<source>::<run>::<seq>`, every segment non-empty.
fn is_well_formed_trace_id(trace_id: &str) -> bool {
    let segments: Vec<&str> = trace_id.split("::").collect();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}

/// Validate an entire JSONL file.
///
/// Returns the total line count and any validation errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(validate_log_text(&content))
}

/// Validate JSONL text already in memory.
#[must_use]
pub fn validate_log_text(content: &str) -> (usize, Vec<LogValidationError>) {
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    (line_count, all_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sublime_mock_api::{Arg, CatalogBuilder, HostContext, TraceMode};

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("sublime-mock::run-1::001", LogLevel::Info, "verify_start");
        let json = entry.to_jsonl().expect("serialize");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "sublime-mock::run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "verify_start");
        assert!(parsed.get("symbol").is_none());
        assert!(parsed.get("outcome").is_none());
    }

    #[test]
    fn emitter_assigns_sequential_trace_ids() {
        let mut emitter = LogEmitter::to_buffer("run-7");
        let first = emitter.emit(LogLevel::Info, "verify_start").expect("emit");
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "verify_entry")
                    .with_symbol("version")
                    .with_outcome(Outcome::Fail),
            )
            .expect("emit");
        assert_eq!(first.trace_id, "sublime-mock::run-7::001");
        assert_eq!(emitter.emitted(), 2);

        let text = String::from_utf8(emitter.into_inner()).expect("utf8");
        let (lines, errors) = validate_log_text(&text);
        assert_eq!(lines, 2);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(text.contains("sublime-mock::run-7::002"));
    }

    #[test]
    fn validator_rejects_bad_records() {
        let errs = validate_log_line(r#"{"timestamp":"t","level":"loud","event":"x"}"#, 3)
            .expect_err("invalid");
        let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"trace_id"));
        assert!(fields.contains(&"level"));
        assert_eq!(errs[0].line_number, 3);

        assert!(validate_log_line("[1,2]", 1).is_err());
        assert!(validate_log_line("nope", 1).is_err());
        assert!(
            validate_log_line(
                r#"{"timestamp":"t","trace_id":"plain","level":"info","event":"x"}"#,
                1
            )
            .is_err()
        );
    }

    #[test]
    fn trace_id_needs_three_segments() {
        let line = |id: &str| {
            format!(r#"{{"timestamp":"t","trace_id":"{id}","level":"info","event":"x"}}"#)
        };
        for bad in ["run::001", "a::b::c::d", "sublime-mock::::001", "::run::001"] {
            let errs = validate_log_line(&line(bad), 1).expect_err(bad);
            assert_eq!(errs[0].field, "trace_id", "{bad}");
        }
        assert!(validate_log_line(&line("sublime-mock::run-1::001"), 1).is_ok());
    }

    #[test]
    fn file_written_by_emitter_validates() {
        let path = std::env::temp_dir().join(format!(
            "sublime-mock-log-{}-{}.jsonl",
            std::process::id(),
            line!()
        ));
        let mut emitter = LogEmitter::to_file(&path, "file").expect("create log");
        emitter.emit(LogLevel::Info, "verify_start").expect("emit");
        emitter
            .emit_entry(LogEntry::new("", LogLevel::Warn, "verify_entry").with_outcome(Outcome::Fail))
            .expect("emit");
        emitter.flush().expect("flush");
        drop(emitter);

        let (lines, errors) = validate_log_file(&path).expect("read log");
        assert_eq!(lines, 2);
        assert!(errors.is_empty(), "{errors:?}");

        std::fs::write(&path, "{\"event\":\"x\"}\n").expect("rewrite");
        let (lines, errors) = validate_log_file(&path).expect("read log");
        assert_eq!(lines, 1);
        assert!(errors.iter().any(|e| e.field == "trace_id"));

        std::fs::remove_file(&path).expect("cleanup");
        assert!(validate_log_file(&path).is_err());
    }

    #[test]
    fn stub_call_trace_records_validate() {
        let catalog = CatalogBuilder::new().trace(TraceMode::Json).build();
        let (ctx, console) = HostContext::detached();
        catalog
            .call("status_message", vec![Arg::from(serde_json::json!("hi"))], &ctx)
            .expect("call");
        let lines = console.trace_lines();
        assert_eq!(lines.len(), 1);
        let entry = validate_log_line(&lines[0], 1).expect("valid trace record");
        assert_eq!(entry.level, LogLevel::Trace);
        assert_eq!(entry.event, "stub_call");
        assert_eq!(entry.symbol.as_deref(), Some("status_message"));
    }
}
