//! Logging for JouleGL
//!
//! Entries carry a severity, a source component and an optional call site.
//! Each `GraphicsContext` owns its `Logger` and drops entries below its
//! minimum severity, so the `gl_*` macros take the context first.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Destination of log entries
///
/// A context hands every entry at or above its minimum severity to its
/// logger.
///
/// # Example
///
/// ```no_run
/// use joulegl::jgl::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Append entry.message to self.file...
///     }
/// }
/// ```
pub trait Logger {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "joulegl::OverflowBuffer"
    pub source: String,
    pub message: String,
    /// Call site, filled for `gl_error!`, `gl_err!` and `gl_bail!`
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

/// Severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used by `DefaultLogger`
    pub fn tag(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Colored console logger
///
/// Line format: `HH:MM:SS.mmm TAG source: message [file:line]`.
/// Warnings and errors go to stderr, everything else to stdout.
pub struct DefaultLogger;

impl DefaultLogger {
    fn format(entry: &LogEntry) -> String {
        let time: DateTime<Local> = entry.timestamp.into();
        let tag = match entry.severity {
            LogSeverity::Trace => entry.severity.tag().dimmed(),
            LogSeverity::Debug => entry.severity.tag().cyan(),
            LogSeverity::Info => entry.severity.tag().green(),
            LogSeverity::Warn => entry.severity.tag().yellow(),
            LogSeverity::Error => entry.severity.tag().red().bold(),
        };
        let mut line = format!(
            "{} {} {}: {}",
            time.format("%H:%M:%S%.3f"),
            tag,
            entry.source.as_str().bright_blue(),
            entry.message
        );
        if let (Some(file), Some(number)) = (entry.file, entry.line) {
            line.push_str(&format!(" [{}:{}]", file, number).dimmed().to_string());
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let line = Self::format(entry);
        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```ignore
/// gl_trace!(ctx, "joulegl::GpuBuffer", "Uploading {} bytes", len);
/// ```
#[macro_export]
macro_rules! gl_trace {
    ($ctx:expr, $source:expr, $($arg:tt)*) => {
        $ctx.log(
            $crate::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
#[macro_export]
macro_rules! gl_debug {
    ($ctx:expr, $source:expr, $($arg:tt)*) => {
        $ctx.log(
            $crate::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! gl_info {
    ($ctx:expr, $source:expr, $($arg:tt)*) => {
        $ctx.log(
            $crate::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! gl_warn {
    ($ctx:expr, $source:expr, $($arg:tt)*) => {
        $ctx.log(
            $crate::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```ignore
/// gl_error!(ctx, "joulegl::ShaderProgram", "Link failed: {}", log);
/// ```
#[macro_export]
macro_rules! gl_error {
    ($ctx:expr, $source:expr, $($arg:tt)*) => {
        $ctx.log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an error value at ERROR severity and evaluate to it
///
/// # Example
///
/// ```ignore
/// let err = gl_err!(ctx, "joulegl::GpuBuffer", Error::NotLoaded(label));
/// ```
#[macro_export]
macro_rules! gl_err {
    ($ctx:expr, $source:expr, $error:expr) => {{
        let error: $crate::error::Error = $error;
        $ctx.log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            error.to_string(),
            file!(),
            line!()
        );
        error
    }};
}

/// Log an error value at ERROR severity and return it from the current function
#[macro_export]
macro_rules! gl_bail {
    ($ctx:expr, $source:expr, $error:expr) => {
        return Err($crate::gl_err!($ctx, $source, $error))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
