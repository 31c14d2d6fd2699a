//! Call-trace wrapper.
//!
//! [`wrap`] is applied to every stub body when the catalog is built. With
//! tracing off it hands back the body untouched; otherwise the returned body
//! announces the call on the trace channel and then delegates.

use serde::Serialize;

use crate::catalog::{StubFn, stub_fn};
use crate::config::TraceMode;

/// One JSONL trace record, in the structured-log shape the harness reads.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord<'a> {
    pub timestamp: String,
    pub trace_id: String,
    pub level: &'static str,
    pub event: &'static str,
    pub symbol: &'a str,
    pub details: serde_json::Value,
}

impl<'a> TraceRecord<'a> {
    #[must_use]
    pub fn stub_call(symbol: &'a str, seq: u64, given: usize) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: format!("sublime-mock::{}::{seq:03}", std::process::id()),
            level: "trace",
            event: "stub_call",
            symbol,
            details: serde_json::json!({ "args": given }),
        }
    }
}

/// Plain-text announcement for one call.
#[must_use]
pub fn plain_line(name: &str, given: usize) -> String {
    format!("MOCK API: {name}({given} args)")
}

/// Wrap `inner` according to `mode`. `TraceMode::Off` returns `inner` itself.
#[must_use]
pub fn wrap(name: &'static str, inner: StubFn, mode: TraceMode) -> StubFn {
    match mode {
        TraceMode::Off => inner,
        TraceMode::Plain => stub_fn(move |inv| {
            inv.ctx().console().trace(&plain_line(name, inv.given()));
            inner(inv)
        }),
        TraceMode::Json => stub_fn(move |inv| {
            let ctx = inv.ctx();
            let record = TraceRecord::stub_call(name, ctx.next_trace_seq(), inv.given());
            if let Ok(line) = serde_json::to_string(&record) {
                ctx.console().trace(&line);
            }
            inner(inv)
        }),
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let days = i64::try_from(secs / 86_400).unwrap_or(0);
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::{Arg, CatalogBuilder};
    use crate::context::HostContext;
    use serde_json::{Value, json};

    fn noop() -> StubFn {
        stub_fn(|_| Ok(Value::Null))
    }

    #[test]
    fn off_returns_same_body() {
        let inner = noop();
        let wrapped = wrap("version", inner.clone(), TraceMode::Off);
        assert!(Arc::ptr_eq(&inner, &wrapped));
    }

    #[test]
    fn plain_wraps_in_new_body() {
        let inner = noop();
        let wrapped = wrap("version", inner.clone(), TraceMode::Plain);
        assert!(!Arc::ptr_eq(&inner, &wrapped));
    }

    #[test]
    fn plain_trace_goes_to_trace_channel_only() {
        let catalog = CatalogBuilder::new().trace(TraceMode::Plain).build();
        let (ctx, console) = HostContext::detached();
        catalog
            .call("log_message", vec![Arg::from(json!("hi"))], &ctx)
            .expect("call");
        assert_eq!(console.trace_lines(), vec!["MOCK API: log_message(1 args)"]);
        assert_eq!(console.out_lines(), vec!["hi"]);
    }

    #[test]
    fn trace_counts_given_not_defaulted_args() {
        let catalog = CatalogBuilder::new().trace(TraceMode::Plain).build();
        let (ctx, console) = HostContext::detached();
        catalog
            .call("ok_cancel_dialog", vec![Arg::from(json!("m"))], &ctx)
            .expect("call");
        assert_eq!(console.trace_lines(), vec!["MOCK API: ok_cancel_dialog(1 args)"]);
    }

    #[test]
    fn json_trace_is_structured() {
        let catalog = CatalogBuilder::new().trace(TraceMode::Json).build();
        let (ctx, console) = HostContext::detached();
        catalog.call("version", vec![], &ctx).expect("call");
        catalog.call("platform", vec![], &ctx).expect("call");

        let lines = console.trace_lines();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(&lines[0]).expect("json");
        assert_eq!(first["event"], "stub_call");
        assert_eq!(first["level"], "trace");
        assert_eq!(first["symbol"], "version");
        assert_eq!(first["details"]["args"], 0);
        assert!(first["trace_id"].as_str().expect("trace_id").ends_with("::001"));
        let second: Value = serde_json::from_str(&lines[1]).expect("json");
        assert!(second["trace_id"].as_str().expect("trace_id").ends_with("::002"));
    }

    #[test]
    fn wrapped_result_is_unchanged() {
        let traced = CatalogBuilder::new().trace(TraceMode::Plain).build();
        let plain = CatalogBuilder::new().build();
        let (ctx, _console) = HostContext::detached();
        assert_eq!(
            traced.call("version", vec![], &ctx).expect("call"),
            plain.call("version", vec![], &ctx).expect("call")
        );
    }

    #[test]
    fn utc_formatting_uses_real_calendar() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        // 2000-02-29 12:34:56 UTC
        assert_eq!(format_utc(951_827_696, 7), "2000-02-29T12:34:56.007Z");
        // 2024-12-31 23:59:59 UTC
        assert_eq!(format_utc(1_735_689_599, 999), "2024-12-31T23:59:59.999Z");
    }
}
