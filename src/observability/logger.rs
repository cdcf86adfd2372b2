//! Structured JSON logger
//!
//! Every line is one JSON object: `event`, then `severity`, then the
//! caller's fields sorted by key. ERROR and FATAL lines go to stderr, the
//! rest to stdout. Lines below the process-wide threshold are dropped.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

static THRESHOLD: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-object detail
    Trace = 0,
    /// Run progress
    Info = 1,
    /// Findings that do not fail an object
    Warn = 2,
    /// Failed objects
    Error = 3,
    /// Broken collaborator contracts
    Fatal = 4,
}

impl Severity {
    const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Upper-case name written in the `severity` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parses a `log_level` value, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("warning") {
            return Some(Severity::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(name))
    }

    fn writes_to_stderr(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide structured logger
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written
    pub fn set_threshold(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    /// Current threshold
    pub fn threshold() -> Severity {
        let stored = THRESHOLD.load(Ordering::Relaxed);
        Severity::ALL
            .into_iter()
            .find(|severity| *severity as u8 == stored)
            .unwrap_or(Severity::Fatal)
    }

    /// Writes one line, unless `severity` is below the threshold
    pub fn emit(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < Self::threshold() {
            return;
        }
        let line = Self::render(severity, event, fields);
        // a lost log line never changes a verdict
        let _ = if severity.writes_to_stderr() {
            io::stderr().lock().write_all(line.as_bytes())
        } else {
            io::stdout().lock().write_all(line.as_bytes())
        };
    }

    /// The newline-terminated JSON line `emit` would write
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(64 + 32 * fields.len());
        line.push_str("{\"event\":");
        push_json_string(&mut line, event);
        line.push_str(",\"severity\":");
        push_json_string(&mut line, severity.as_str());
        for (key, value) in sorted {
            line.push(',');
            push_json_string(&mut line, key);
            line.push(':');
            push_json_string(&mut line, value);
        }
        line.push_str("}\n");
        line
    }
}

fn push_json_string(line: &mut String, text: &str) {
    match serde_json::to_string(text) {
        Ok(quoted) => line.push_str(&quoted),
        Err(_) => line.push_str("\"\""),
    }
}
