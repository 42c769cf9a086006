//! Structured JSONL logging to a file and human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.hotkey-bridge/logs/hotkey-bridge.jsonl) - structured for tooling
//! - **Compact to stderr** - human-readable for developers
//!
//! Shortcut lifecycle events are also kept in a small in-memory ring so a host
//! UI can show why a shortcut did not register.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hotkey_bridge::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init(None);
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::hotkeys::SlotId;

const LOG_FILE_NAME: &str = "hotkey-bridge.jsonl";
const DEFAULT_FILTER: &str = "info";

static EVENT_BUFFER: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();
const MAX_EVENT_LINES: usize = 50;

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    filter: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LoggingGuard {
    /// Replace the active filter, e.g. once the config has been read.
    ///
    /// Returns false when `RUST_LOG` is set, when another subscriber was
    /// installed first, or when `directive` does not parse.
    pub fn apply_filter(&self, directive: &str) -> bool {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return false;
        }
        let Some(handle) = &self.filter else {
            return false;
        };
        match EnvFilter::try_new(directive) {
            Ok(filter) => handle.reload(filter).is_ok(),
            Err(e) => {
                tracing::warn!(directive, error = %e, "Ignoring invalid log filter");
                false
            }
        }
    }
}

/// Initialize the dual-output logging system.
///
/// `RUST_LOG` wins over `filter`; without either the level is `info`.
/// If the log file cannot be opened, logging continues on stderr only.
/// Calling this twice keeps the first subscriber.
pub fn init(filter: Option<&str>) -> LoggingGuard {
    if let Err(e) = fs::create_dir_all(get_log_dir()) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_path();

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            None
        }
    };

    // Create non-blocking writer for file (never stalls the message pump)
    let (json_layer, file_guard) = match file {
        Some(file) => {
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);

    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    if installed.is_ok() {
        tracing::info!(
            event_type = "app_lifecycle",
            action = "started",
            log_path = %log_path.display(),
            "Logging initialized"
        );
    }

    LoggingGuard {
        _file_guard: file_guard,
        filter: installed.is_ok().then_some(filter_handle),
    }
}

/// Get the log directory path (~/.hotkey-bridge/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".hotkey-bridge").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("hotkey-bridge-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

fn add_to_buffer(line: String) {
    let buffer = EVENT_BUFFER.get_or_init(|| Mutex::new(VecDeque::with_capacity(MAX_EVENT_LINES)));
    let mut buf = buffer.lock();
    if buf.len() >= MAX_EVENT_LINES {
        buf.pop_front();
    }
    buf.push_back(line);
}

/// Recent shortcut events, oldest first, for host diagnostics.
pub fn recent_events() -> Vec<String> {
    EVENT_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().cloned().collect())
        .unwrap_or_default()
}

fn event_line(name: &str, action: &str, slot: Option<SlotId>, success: bool) -> String {
    let slot_text = slot
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} (slot={}, success={})",
        action, name, slot_text, success
    )
}

/// Log a shortcut lifecycle event with structured fields.
///
/// Failures are logged at warn level, successes at info.
pub fn log_shortcut_event(name: &str, action: &str, slot: Option<SlotId>, success: bool) {
    add_to_buffer(event_line(name, action, slot, success));

    let slot = slot.map(|s| s.get());
    if success {
        tracing::info!(
            event_type = "shortcut_event",
            shortcut = name,
            action = action,
            slot = slot,
            success = success,
            "Shortcut {} {}", action, name
        );
    } else {
        tracing::warn!(
            event_type = "shortcut_event",
            shortcut = name,
            action = action,
            slot = slot,
            success = success,
            "Shortcut {} {} failed", action, name
        );
    }
}
