use thiserror::Error;
use tracing::{error, warn};

use crate::hotkeys::SlotId;
use crate::shortcuts::KeyDescriptor;

/// Error severity for host UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable, caller-correctable
    Error,    // operation failed
    Critical, // subsystem unusable
}

/// Errors raised by the hotkey subsystem.
///
/// None of these is fatal: after any of them the registry is still consistent
/// and usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("unsupported key symbol '{0}' (expected a single letter A-Z or digit 0-9)")]
    InvalidKey(String),

    #[error("unknown modifier '{0}'")]
    InvalidModifier(String),

    #[error("system rejected hotkey {descriptor} for '{name}': {reason}")]
    BindFailed {
        name: String,
        descriptor: KeyDescriptor,
        reason: String,
    },

    #[error("'{name}' lost {descriptor} to '{by}'")]
    Displaced {
        name: String,
        descriptor: KeyDescriptor,
        by: String,
    },

    #[error("no free hotkey slots left in range {first}..={last}")]
    SlotsExhausted { first: SlotId, last: SlotId },

    #[error("hotkey backend unavailable: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HotkeyError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidKey(_) => ErrorSeverity::Warning,
            Self::InvalidModifier(_) => ErrorSeverity::Warning,
            Self::BindFailed { .. } => ErrorSeverity::Warning,
            Self::Displaced { .. } => ErrorSeverity::Warning,
            Self::SlotsExhausted { .. } => ErrorSeverity::Error,
            Self::Backend(_) => ErrorSeverity::Critical,
            Self::Config(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidKey(symbol) => {
                format!("'{}' can't be used as a shortcut key. Use a letter or a digit.", symbol)
            }
            Self::InvalidModifier(name) => format!("'{}' is not a modifier key", name),
            Self::BindFailed { descriptor, .. } => format!(
                "{} is already in use by another application or the system",
                descriptor
            ),
            Self::Displaced { descriptor, by, .. } => {
                format!("{} is also assigned to '{}', which took it over", descriptor, by)
            }
            Self::SlotsExhausted { .. } => "Too many shortcuts are registered".to_string(),
            Self::Backend(msg) => format!("Global shortcuts are unavailable: {}", msg),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, HotkeyError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use hotkey_bridge::error::ResultExt;
///
/// // Fire-and-forget registration
/// registry.register("quick-note", mods, "N").log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but gracefully degrade in production.
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}
