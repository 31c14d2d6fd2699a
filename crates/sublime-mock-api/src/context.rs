//! Host context handed to every stub invocation.
//!
//! Stubs never touch hidden globals: the logging toggles, the console
//! channels and the clipboard all come from the [`HostContext`] the caller
//! passes in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config;

/// The host's two verbose-logging toggles. Last writer wins.
#[derive(Debug, Default)]
pub struct LogFlags {
    commands: AtomicBool,
    input: AtomicBool,
}

impl LogFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_commands(&self, active: bool) {
        self.commands.store(active, Ordering::Relaxed);
    }

    #[must_use]
    pub fn commands_active(&self) -> bool {
        self.commands.load(Ordering::Relaxed)
    }

    pub fn set_input(&self, active: bool) {
        self.input.store(active, Ordering::Relaxed);
    }

    #[must_use]
    pub fn input_active(&self) -> bool {
        self.input.load(Ordering::Relaxed)
    }
}

/// Output channels available to stubs.
///
/// `trace` is kept apart from `out` and `err` so call tracing never mixes
/// with what a stub itself prints.
pub trait Console: Send + Sync {
    fn out(&self, line: &str);
    fn err(&self, line: &str);
    fn trace(&self, line: &str);
}

/// Writes `out` to stdout, `err` and `trace` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn out(&self, line: &str) {
        println!("{line}");
    }

    fn err(&self, line: &str) {
        eprintln!("{line}");
    }

    fn trace(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Records every channel in memory.
#[derive(Debug, Default)]
pub struct BufferConsole {
    out: Mutex<Vec<String>>,
    err: Mutex<Vec<String>>,
    trace: Mutex<Vec<String>>,
}

impl BufferConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn out_lines(&self) -> Vec<String> {
        self.out.lock().clone()
    }

    #[must_use]
    pub fn err_lines(&self) -> Vec<String> {
        self.err.lock().clone()
    }

    #[must_use]
    pub fn trace_lines(&self) -> Vec<String> {
        self.trace.lock().clone()
    }
}

impl Console for BufferConsole {
    fn out(&self, line: &str) {
        self.out.lock().push(line.to_string());
    }

    fn err(&self, line: &str) {
        self.err.lock().push(line.to_string());
    }

    fn trace(&self, line: &str) {
        self.trace.lock().push(line.to_string());
    }
}

/// Access to a local clipboard, if one exists.
pub trait Clipboard: Send + Sync {
    /// Current clipboard text, or `None` when no clipboard is reachable.
    fn get(&self) -> Option<String>;
    /// Replace the clipboard text. Returns `false` when that was not possible.
    fn set(&self, text: &str) -> bool;
}

/// A clipboard that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn get(&self) -> Option<String> {
        None
    }

    fn set(&self, _text: &str) -> bool {
        false
    }
}

struct ClipboardTool {
    paste: (&'static str, &'static [&'static str]),
    copy: (&'static str, &'static [&'static str]),
}

const CLIPBOARD_TOOLS: &[ClipboardTool] = &[
    ClipboardTool {
        paste: ("pbpaste", &[]),
        copy: ("pbcopy", &[]),
    },
    ClipboardTool {
        paste: ("wl-paste", &["--no-newline"]),
        copy: ("wl-copy", &[]),
    },
    ClipboardTool {
        paste: ("xclip", &["-selection", "clipboard", "-o"]),
        copy: ("xclip", &["-selection", "clipboard"]),
    },
    ClipboardTool {
        paste: ("xsel", &["--clipboard", "--output"]),
        copy: ("xsel", &["--clipboard", "--input"]),
    },
];

/// Delegates to the first clipboard command-line tool found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    paste: (PathBuf, &'static [&'static str]),
    copy: (PathBuf, &'static [&'static str]),
}

impl SystemClipboard {
    /// Probe `PATH` for a supported tool pair.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
        CLIPBOARD_TOOLS.iter().find_map(|tool| {
            let paste = find_program(&dirs, tool.paste.0)?;
            let copy = find_program(&dirs, tool.copy.0)?;
            Some(Self {
                paste: (paste, tool.paste.1),
                copy: (copy, tool.copy.1),
            })
        })
    }
}

fn find_program(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_file(candidate))
}

fn is_file(path: &Path) -> bool {
    path.metadata().is_ok_and(|meta| meta.is_file())
}

impl Clipboard for SystemClipboard {
    fn get(&self) -> Option<String> {
        let output = Command::new(&self.paste.0)
            .args(self.paste.1)
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn set(&self, text: &str) -> bool {
        let Ok(mut child) = Command::new(&self.copy.0)
            .args(self.copy.1)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            return false;
        };
        let written = child
            .stdin
            .take()
            .is_some_and(|mut stdin| stdin.write_all(text.as_bytes()).is_ok());
        let exited = child.wait().is_ok_and(|status| status.success());
        written && exited
    }
}

/// Everything a stub may observe or affect.
pub struct HostContext {
    pub flags: LogFlags,
    console: Arc<dyn Console>,
    clipboard: Arc<dyn Clipboard>,
    trace_seq: AtomicU64,
}

impl HostContext {
    #[must_use]
    pub fn new(console: Arc<dyn Console>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            flags: LogFlags::new(),
            console,
            clipboard,
            trace_seq: AtomicU64::new(0),
        }
    }

    /// Standard streams plus whatever clipboard tool the machine has.
    #[must_use]
    pub fn from_env() -> Self {
        let clipboard: Arc<dyn Clipboard> = match config::clipboard_enabled()
            .then(SystemClipboard::detect)
            .flatten()
        {
            Some(system) => Arc::new(system),
            None => Arc::new(NoClipboard),
        };
        Self::new(Arc::new(StdConsole), clipboard)
    }

    /// In-memory console and no clipboard. Returns the console so callers
    /// can inspect what was written.
    #[must_use]
    pub fn detached() -> (Self, Arc<BufferConsole>) {
        let console = Arc::new(BufferConsole::new());
        let ctx = Self::new(console.clone(), Arc::new(NoClipboard));
        (ctx, console)
    }

    #[must_use]
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    #[must_use]
    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    /// Next sequence number for trace records emitted under this context.
    pub fn next_trace_seq(&self) -> u64 {
        self.trace_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("flags", &self.flags)
            .field("trace_seq", &self.trace_seq)
            .finish_non_exhaustive()
    }
}
