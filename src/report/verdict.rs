//! Verdict vocabulary
//!
//! Aggregation is "worst status wins":
//! `Failed` > `Incomplete` > `Skipped` > `Ok`.
//! Warnings never change the status; they are counted separately.

use std::fmt;

use serde::Serialize;

use crate::observability::Severity;

/// Aggregatable outcome class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing wrong was found
    Ok,
    /// A check was deliberately skipped to protect the memory ceiling
    Skipped,
    /// Required objects are missing
    Incomplete,
    /// Data is inconsistent, unexpected, or could not be checked
    Failed,
}

impl Status {
    /// Returns the worse of two statuses
    pub fn worst(self, other: Status) -> Status {
        self.max(other)
    }

    /// True when the run should be reported as consistent
    ///
    /// Resource-guard skips are soft: they warn but do not fail.
    pub fn passed(&self) -> bool {
        matches!(self, Status::Ok | Status::Skipped)
    }

    /// Returns the lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Skipped => "skipped",
            Status::Incomplete => "incomplete",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one referential-integrity relationship check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum IntegrityVerdict {
    /// Both sides agree
    Ok,
    /// `key` does not list (or does not exist for) the given origin rows
    Inconsistent {
        /// Foreign-key value (row on the "one" side)
        key: i64,
        /// Rows whose reference could not be matched
        origins: Vec<i64>,
    },
    /// Data has a shape the check cannot interpret, or could not be read
    Unexpected {
        /// What was found
        detail: String,
    },
    /// A multi-valued cell was too large for the chunk working set
    SkippedTooLarge,
}

impl IntegrityVerdict {
    /// Status class of this verdict
    pub fn status(&self) -> Status {
        match self {
            IntegrityVerdict::Ok => Status::Ok,
            IntegrityVerdict::SkippedTooLarge => Status::Skipped,
            IntegrityVerdict::Inconsistent { .. } | IntegrityVerdict::Unexpected { .. } => {
                Status::Failed
            }
        }
    }

    /// True for `Ok`
    pub fn is_ok(&self) -> bool {
        matches!(self, IntegrityVerdict::Ok)
    }
}

impl fmt::Display for IntegrityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityVerdict::Ok => write!(f, "referential integrity ok"),
            IntegrityVerdict::Inconsistent { key, origins } => write!(
                f,
                "failed referential integrity check at key {} for rows {:?}",
                key, origins
            ),
            IntegrityVerdict::Unexpected { detail } => {
                write!(f, "failed referential integrity check: {}", detail)
            }
            IntegrityVerdict::SkippedTooLarge => {
                write!(f, "referential integrity could not be checked, skipped")
            }
        }
    }
}

/// Outcome of a structural invariant check over a row-set bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum StructuralVerdict {
    /// All required objects are present
    Ok,
    /// Required objects are absent
    Incomplete {
        /// Names of the missing objects
        missing: Vec<String>,
    },
    /// An object outside the known vocabulary was found (warning)
    Unexpected {
        /// Name of the extra object
        object: String,
    },
}

impl StructuralVerdict {
    /// Status class of this verdict
    pub fn status(&self) -> Status {
        match self {
            StructuralVerdict::Ok | StructuralVerdict::Unexpected { .. } => Status::Ok,
            StructuralVerdict::Incomplete { .. } => Status::Incomplete,
        }
    }
}

impl fmt::Display for StructuralVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralVerdict::Ok => write!(f, "contains all required objects"),
            StructuralVerdict::Incomplete { missing } => write!(
                f,
                "does not contain all required objects; missing {}",
                missing.join(", ")
            ),
            StructuralVerdict::Unexpected { object } => {
                write!(f, "contains unexpected object '{}'", object)
            }
        }
    }
}

/// Outcome of the container's own physical checks, relayed from the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CheckVerdict {
    /// The object checked out
    Checked {
        /// Optional detail from the container
        message: Option<String>,
    },
    /// The object failed a physical check
    Failed {
        /// Failure code
        code: String,
        /// Detail
        message: String,
    },
    /// A component digest did not match
    ChecksumMismatch {
        /// Component file
        file: String,
    },
    /// Something worth flagging that does not fail the object
    Warning {
        /// Detail
        message: String,
    },
}

impl CheckVerdict {
    /// Status class of this verdict
    pub fn status(&self) -> Status {
        match self {
            CheckVerdict::Checked { .. } | CheckVerdict::Warning { .. } => Status::Ok,
            CheckVerdict::Failed { .. } | CheckVerdict::ChecksumMismatch { .. } => Status::Failed,
        }
    }
}

impl fmt::Display for CheckVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckVerdict::Checked { message } => {
                write!(f, "{}", message.as_deref().unwrap_or("checked"))
            }
            CheckVerdict::Failed { code, message } => write!(f, "{}: {}", code, message),
            CheckVerdict::ChecksumMismatch { file } => {
                write!(f, "file '{}' failed checksum verification", file)
            }
            CheckVerdict::Warning { message } => write!(f, "{}", message),
        }
    }
}

/// Any verdict the validator reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Referential integrity
    Integrity(IntegrityVerdict),
    /// Structural invariants
    Structural(StructuralVerdict),
    /// Physical checks
    Check(CheckVerdict),
}

impl Verdict {
    /// Status class of this verdict
    pub fn status(&self) -> Status {
        match self {
            Verdict::Integrity(v) => v.status(),
            Verdict::Structural(v) => v.status(),
            Verdict::Check(v) => v.status(),
        }
    }

    /// True for findings that warn without changing the status
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Verdict::Structural(StructuralVerdict::Unexpected { .. })
                | Verdict::Check(CheckVerdict::Warning { .. })
                | Verdict::Integrity(IntegrityVerdict::SkippedTooLarge)
        )
    }

    /// Log severity used when rendering this verdict
    pub fn severity(&self) -> Severity {
        match self.status() {
            Status::Failed | Status::Incomplete => Severity::Error,
            Status::Skipped => Severity::Warn,
            Status::Ok if self.is_warning() => Severity::Warn,
            Status::Ok => Severity::Info,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Integrity(v) => write!(f, "{}", v),
            Verdict::Structural(v) => write!(f, "{}", v),
            Verdict::Check(v) => write!(f, "{}", v),
        }
    }
}
