//! Stubs with observable behavior.
//!
//! Everything here prints through the context console, touches the log
//! flags or clipboard, or computes a result from its arguments. All other
//! stubs return fixed placeholders (see [`crate::surface`]).

use serde_json::{Map, Value};

use crate::catalog::{Arg, Invocation, StubError, StubResult};
use crate::codec;

pub(crate) const CLIPBOARD_GET_UNAVAILABLE: &str =
    "Could not get clipboard data; required packages not available.";
pub(crate) const CLIPBOARD_SET_UNAVAILABLE: &str =
    "Could not set clipboard data; required packages not available.";

/// Render a value the way the host prints it: strings bare, `None`,
/// `True`/`False`, everything else as JSON.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::from("None"),
        Value::Bool(true) => String::from("True"),
        Value::Bool(false) => String::from("False"),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn print(inv: &Invocation<'_>, line: &str) -> StubResult {
    inv.ctx().console().out(line);
    Ok(Value::Null)
}

pub(crate) fn log_message(inv: &Invocation<'_>) -> StubResult {
    print(inv, &display(&inv.value(0)))
}

pub(crate) fn status_message(inv: &Invocation<'_>) -> StubResult {
    print(inv, &display(&inv.value(0)))
}

pub(crate) fn message_dialog(inv: &Invocation<'_>) -> StubResult {
    print(inv, &display(&inv.value(0)))
}

pub(crate) fn error_message(inv: &Invocation<'_>) -> StubResult {
    inv.ctx().console().err(&display(&inv.value(0)));
    Ok(Value::Null)
}

pub(crate) fn ok_cancel_dialog(inv: &Invocation<'_>) -> StubResult {
    let console = inv.ctx().console();
    console.out(&display(&inv.value(1)));
    console.out(&display(&inv.value(0)));
    Ok(Value::Null)
}

pub(crate) fn yes_no_cancel_dialog(inv: &Invocation<'_>) -> StubResult {
    let console = inv.ctx().console();
    console.out(&display(&inv.value(0)));
    console.out(&format!("Yes = {}", display(&inv.value(1))));
    console.out(&format!("No  = {}", display(&inv.value(2))));
    Ok(Value::Null)
}

pub(crate) fn run_command(inv: &Invocation<'_>) -> StubResult {
    print(
        inv,
        &format!(
            "MOCK API: Running command {} with args: {}",
            display(&inv.value(0)),
            display(&inv.value(1))
        ),
    )
}

/// Clipboard text cut to `size_limit` bytes, backing off to a char boundary.
pub(crate) fn get_clipboard(inv: &Invocation<'_>) -> StubResult {
    let Some(mut text) = inv.ctx().clipboard().get() else {
        return Ok(Value::from(CLIPBOARD_GET_UNAVAILABLE));
    };
    if let Some(limit) = inv.value(0).as_u64().and_then(|n| usize::try_from(n).ok())
        && text.len() > limit
    {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    Ok(Value::String(text))
}

pub(crate) fn set_clipboard(inv: &Invocation<'_>) -> StubResult {
    let text = display(&inv.value(0));
    if !inv.ctx().clipboard().set(&text) {
        inv.ctx().console().err(CLIPBOARD_SET_UNAVAILABLE);
    }
    Ok(Value::Null)
}

pub(crate) fn log_commands(inv: &Invocation<'_>) -> StubResult {
    let flag = inv.value(0);
    inv.ctx().flags.set_commands(truthy(&flag));
    print(inv, &format!("log_commands: {}", display(&flag)))
}

pub(crate) fn log_input(inv: &Invocation<'_>) -> StubResult {
    let flag = inv.value(0);
    inv.ctx().flags.set_input(truthy(&flag));
    print(inv, &format!("log_input: {}", display(&flag)))
}

pub(crate) fn log_result_regex(inv: &Invocation<'_>) -> StubResult {
    print(inv, &format!("log_result_regex: {}", display(&inv.value(0))))
}

pub(crate) fn log_indexing(inv: &Invocation<'_>) -> StubResult {
    print(inv, &format!("log_indexing: {}", display(&inv.value(0))))
}

pub(crate) fn log_build_systems(inv: &Invocation<'_>) -> StubResult {
    print(inv, &format!("log_build_systems: {}", display(&inv.value(0))))
}

pub(crate) fn score_selector(inv: &Invocation<'_>) -> StubResult {
    print(
        inv,
        &format!(
            "score_selector: {} {}",
            display(&inv.value(0)),
            display(&inv.value(1))
        ),
    )
}

pub(crate) fn encode_value(inv: &Invocation<'_>) -> StubResult {
    let pretty = truthy(&inv.value(1));
    Ok(Value::String(codec::encode_value(&inv.value(0), pretty)))
}

/// Returns `[value, status]`.
pub(crate) fn decode_value(inv: &Invocation<'_>) -> StubResult {
    let (value, status) = match inv.value(0) {
        Value::String(text) => codec::decode_value(&text),
        _ => (Value::String(String::new()), codec::DECODE_MALFORMED),
    };
    Ok(Value::Array(vec![value, Value::from(status)]))
}

pub(crate) fn expand_variables(inv: &Invocation<'_>) -> StubResult {
    let variables = match inv.value(1) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    codec::expand_variables(&inv.value(0), &variables).map_err(StubError::from)
}

/// Runs the callback right away and returns its result; there is no event
/// loop to defer to.
pub(crate) fn set_timeout(inv: &Invocation<'_>) -> StubResult {
    match inv.arg(0) {
        Some(Arg::Callback(f)) => Ok(f()),
        _ => Ok(Value::Null),
    }
}

pub(crate) fn settings_get_default(inv: &Invocation<'_>) -> StubResult {
    Ok(inv.value(2))
}

pub(crate) fn window_run_command(inv: &Invocation<'_>) -> StubResult {
    print(
        inv,
        &format!(
            "Running Window Command {} with args {} in window with id {}",
            display(&inv.value(1)),
            display(&inv.value(2)),
            display(&inv.value(0))
        ),
    )
}

pub(crate) fn window_new_file(inv: &Invocation<'_>) -> StubResult {
    print(
        inv,
        &format!(
            "Creating new file with flags {} and syntax {} in window with id {}",
            display(&inv.value(1)),
            display(&inv.value(2)),
            display(&inv.value(0))
        ),
    )
}

pub(crate) fn window_open_file(inv: &Invocation<'_>) -> StubResult {
    print(
        inv,
        &format!(
            "Opening file {} with flags {} in group {} in window with id {}",
            display(&inv.value(1)),
            display(&inv.value(2)),
            display(&inv.value(3)),
            display(&inv.value(0))
        ),
    )
}
