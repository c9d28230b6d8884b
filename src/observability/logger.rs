//! Structured JSON logger
//!
//! - One log line = one JSON object
//! - `event` first, `severity` second, other fields sorted by key
//! - Synchronous, no buffering
//! - Lines below the configured minimum severity are dropped

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn from_u8(level: u8) -> Severity {
        match level {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// A structured logger that outputs JSON lines.
///
/// Info and below go to stdout, warnings and errors to stderr.
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written. Defaults to `Info`.
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        if severity >= Severity::Warn {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = format_line(severity, event, fields);
        // Logging never fails the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Renders one newline-terminated log line.
fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(128);

    output.push_str("{\"event\":");
    push_json_string(&mut output, event);
    output.push_str(",\"severity\":");
    push_json_string(&mut output, severity.as_str());

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted {
        output.push(',');
        push_json_string(&mut output, key);
        output.push(':');
        push_json_string(&mut output, value);
    }

    output.push_str("}\n");
    output
}

fn push_json_string(output: &mut String, s: &str) {
    // Serializing a str cannot fail
    match serde_json::to_string(s) {
        Ok(quoted) => output.push_str(&quoted),
        Err(_) => output.push_str("\"\""),
    }
}
