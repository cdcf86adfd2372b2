//! Per-object validation report

use chrono::Utc;
use serde::Serialize;

use super::verdict::{Status, Verdict};
use crate::integrity::RelationshipOutcome;
use crate::visit::ObjectKind;

/// One verdict about one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Kind of the object the verdict is about
    pub kind: ObjectKind,
    /// Object name (or relationship label for integrity verdicts)
    pub name: String,
    /// The verdict
    pub verdict: Verdict,
}

impl Finding {
    /// Creates a finding
    pub fn new(kind: ObjectKind, name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            kind,
            name: name.into(),
            verdict,
        }
    }
}

/// Aggregate outcome of validating one top-level database or table
///
/// Only non-`Ok` findings and warnings are retained; every failing check
/// stays individually enumerable.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Identifier shared by every object validated in one invocation
    pub run_id: String,
    /// Path the object was opened from
    pub path: String,
    /// Database or table
    pub kind: ObjectKind,
    /// Root object name
    pub name: String,
    /// RFC 3339 timestamp of the run start
    pub checked_at: String,
    /// Worst status seen
    pub status: Status,
    /// Columns the container reported as checked
    pub columns_checked: u64,
    /// Number of warnings
    pub warnings: u64,
    /// Failures and warnings, in the order found
    pub findings: Vec<Finding>,
    /// Every referential-integrity relationship that was checked
    pub relationships: Vec<RelationshipOutcome>,
}

impl ValidationReport {
    /// Starts an empty, passing report
    pub fn new(
        run_id: impl Into<String>,
        path: impl Into<String>,
        kind: ObjectKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            path: path.into(),
            kind,
            name: name.into(),
            checked_at: Utc::now().to_rfc3339(),
            status: Status::Ok,
            columns_checked: 0,
            warnings: 0,
            findings: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Folds one finding into the aggregate
    pub fn record(&mut self, finding: Finding) {
        let status = finding.verdict.status();
        self.status = self.status.worst(status);

        let warning = finding.verdict.is_warning();
        if warning {
            self.warnings += 1;
        }
        if warning || status != Status::Ok {
            self.findings.push(finding);
        }
    }

    /// True when the object is consistent
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    /// Findings that make the object fail
    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| !finding.verdict.status().passed())
    }
}
