//! Visitation events produced by a container's consistency walk
//!
//! A walk delivers three kinds of reports:
//! - `Visit`: one per object, in pre-order, tagged with its depth
//! - `Checksum`: outcome of a per-component digest comparison
//! - `Done`: an object finished checking, with an optional failure

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message a container attaches to a table/database `Done` report when
/// one or more of its components carries no checksum.
pub const MISSING_CHECKSUMS: &str = "missing checksum file";

/// Prefix of `Done` messages that name an object the container did not expect.
pub const UNEXPECTED_OBJECT_PREFIX: &str = "unexpected object ";

/// Closed vocabulary of objects found inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A database, possibly nested inside another database
    Database,
    /// A table (row-set)
    Table,
    /// A physical column of a table
    Column,
    /// An index of a table
    Index,
}

impl ObjectKind {
    /// Returns the lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Database => "database",
            ObjectKind::Table => "table",
            ObjectKind::Column => "column",
            ObjectKind::Index => "index",
        }
    }

    /// Returns the capitalized name used in human-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Database => "Database",
            ObjectKind::Table => "Table",
            ObjectKind::Column => "Column",
            ObjectKind::Index => "Index",
        }
    }

    /// Databases and tables are the only objects that can be opened directly
    pub fn is_openable(&self) -> bool {
        matches!(self, ObjectKind::Database | ObjectKind::Table)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One object reached by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    /// Object name (no NUL bytes)
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
    /// Depth below the walked root; the root itself is depth 0
    pub depth: u32,
}

impl VisitEvent {
    /// Creates a new visit event
    pub fn new(name: impl Into<String>, kind: ObjectKind, depth: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            depth,
        }
    }
}

/// Failure classes a container attaches to a `Done` report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// A component digest did not match its recorded value
    ChecksumMismatch,
    /// A blob CRC32 did not match its recorded value
    CrcMismatch,
    /// Object data could not be decoded
    Corrupt,
    /// A required component is missing
    Missing,
}

impl FailureCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FailureCode::ChecksumMismatch => "CHECK_CHECKSUM_MISMATCH",
            FailureCode::CrcMismatch => "CHECK_CRC_MISMATCH",
            FailureCode::Corrupt => "CHECK_CORRUPT",
            FailureCode::Missing => "CHECK_MISSING",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single report delivered by a visitation source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitReport {
    /// An object was reached; structural, feeds tree reconstruction
    Visit(VisitEvent),
    /// A component digest was compared
    Checksum {
        /// Kind of the owning object
        kind: ObjectKind,
        /// Name of the owning object
        object: String,
        /// Component file the digest covers
        file: String,
        /// Whether the digest matched
        passed: bool,
    },
    /// An object finished checking; the root's `Done` terminates the walk
    Done {
        /// Kind of the finished object
        kind: ObjectKind,
        /// Name of the finished object
        object: String,
        /// Failure class, if the object failed
        failure: Option<FailureCode>,
        /// Human-readable detail
        message: Option<String>,
    },
}

impl VisitReport {
    /// Shorthand for a structural visit report
    pub fn visit(name: impl Into<String>, kind: ObjectKind, depth: u32) -> Self {
        VisitReport::Visit(VisitEvent::new(name, kind, depth))
    }

    /// Shorthand for a successful `Done` report without a message
    pub fn done(kind: ObjectKind, object: impl Into<String>) -> Self {
        VisitReport::Done {
            kind,
            object: object.into(),
            failure: None,
            message: None,
        }
    }

    /// Shorthand for a failed `Done` report
    pub fn failed(
        kind: ObjectKind,
        object: impl Into<String>,
        failure: FailureCode,
        message: impl Into<String>,
    ) -> Self {
        VisitReport::Done {
            kind,
            object: object.into(),
            failure: Some(failure),
            message: Some(message.into()),
        }
    }
}
