//! Begin/complete logging around one long-running check
//!
//! A scope logs `{name}_BEGIN` when opened and exactly one closing line:
//! `{name}_COMPLETE`, `{name}_ERROR`, or `{name}_INCOMPLETE` if it is dropped
//! while still open (a read error or stop unwinding past the check). Closing
//! lines repeat the opening fields and add `elapsed_ms`.

use std::time::Instant;

use super::logger::{Logger, Severity};

/// Logging scope for one check
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    started: Instant,
    open: bool,
}

impl ObservationScope {
    /// Opens a scope and logs `{name}_BEGIN` with `fields`
    pub fn begin(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            fields: fields
                .iter()
                .map(|(key, value)| (*key, value.to_string()))
                .collect(),
            started: Instant::now(),
            open: true,
        };
        scope.log(Severity::Info, "BEGIN", &[]);
        scope
    }

    /// Logs `{name}_COMPLETE` with `extra` fields
    pub fn complete(mut self, extra: &[(&str, &str)]) {
        self.close(Severity::Info, "COMPLETE", extra);
    }

    /// Logs `{name}_ERROR` with the failure reason
    pub fn fail(mut self, reason: &str) {
        self.close(Severity::Error, "ERROR", &[("reason", reason)]);
    }

    /// Milliseconds since the scope was opened
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    fn close(&mut self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        self.open = false;
        let elapsed = self.elapsed_ms().to_string();
        let mut closing: Vec<(&str, &str)> = extra.to_vec();
        closing.push(("elapsed_ms", elapsed.as_str()));
        self.log(severity, suffix, &closing);
    }

    fn log(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        Logger::emit(severity, &event, &self.line_fields(extra));
    }

    fn line_fields<'s>(&'s self, extra: &[(&'s str, &'s str)]) -> Vec<(&'s str, &'s str)> {
        self.fields
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .chain(extra.iter().copied())
            .collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if self.open {
            self.close(Severity::Warn, "INCOMPLETE", &[("reason", "check did not finish")]);
        }
    }
}
