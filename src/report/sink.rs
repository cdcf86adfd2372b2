//! Reporting sinks
//!
//! The validator pushes `(ObjectKind, name, Verdict)` triples without any
//! knowledge of how they are displayed.

use super::summary::Finding;
use super::verdict::Verdict;
use crate::observability::Logger;
use crate::visit::ObjectKind;

/// Receiver of reported verdicts
pub trait ReportSink {
    /// Accepts one verdict about one object
    fn report(&mut self, kind: ObjectKind, name: &str, verdict: &Verdict);
}

/// Renders every verdict as one structured log line
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, kind: ObjectKind, name: &str, verdict: &Verdict) {
        let status = verdict.status();
        let detail = verdict.to_string();
        Logger::emit(
            verdict.severity(),
            "VERDICT",
            &[
                ("detail", detail.as_str()),
                ("kind", kind.as_str()),
                ("object", name),
                ("status", status.as_str()),
            ],
        );
    }
}

/// Keeps every verdict in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    findings: Vec<Finding>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All verdicts received so far
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Verdicts about the object named `name`
    pub fn about<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.name == name)
    }
}

impl ReportSink for MemorySink {
    fn report(&mut self, kind: ObjectKind, name: &str, verdict: &Verdict) {
        self.findings.push(Finding::new(kind, name, verdict.clone()));
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report(&mut self, _kind: ObjectKind, _name: &str, _verdict: &Verdict) {}
}
