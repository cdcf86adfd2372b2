//! Tree reconstruction errors
//!
//! Error codes:
//! - DBCHECK_TREE_MALFORMED_STREAM (FATAL)
//! - DBCHECK_TREE_CAPACITY_EXCEEDED (FATAL)
//!
//! Both are caller contract violations, never data-integrity findings.

use std::fmt;

/// Severity levels for tree errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run for this object must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Tree error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeErrorCode {
    /// The visitation stream broke the depth/order contract
    MalformedStream,
    /// The stream outgrew the capacity counted by the pre-pass
    CapacityExceeded,
}

impl TreeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TreeErrorCode::MalformedStream => "DBCHECK_TREE_MALFORMED_STREAM",
            TreeErrorCode::CapacityExceeded => "DBCHECK_TREE_CAPACITY_EXCEEDED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for TreeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tree error with context
#[derive(Debug)]
pub struct TreeError {
    code: TreeErrorCode,
    message: String,
    /// Position of the offending event in the stream
    event_index: Option<usize>,
}

impl TreeError {
    /// Create a malformed-stream error
    pub fn malformed(event_index: usize, reason: impl Into<String>) -> Self {
        Self {
            code: TreeErrorCode::MalformedStream,
            message: format!("event {}: {}", event_index, reason.into()),
            event_index: Some(event_index),
        }
    }

    /// Create an empty-stream error
    pub fn empty_stream() -> Self {
        Self {
            code: TreeErrorCode::MalformedStream,
            message: "visitation stream contained no objects".to_string(),
            event_index: None,
        }
    }

    /// Create a capacity error
    pub fn capacity_exceeded(event_index: usize, reason: impl Into<String>) -> Self {
        Self {
            code: TreeErrorCode::CapacityExceeded,
            message: format!("event {}: {}", event_index, reason.into()),
            event_index: Some(event_index),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> TreeErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the index of the offending event, if known
    pub fn event_index(&self) -> Option<usize> {
        self.event_index
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for TreeError {}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TreeErrorCode::MalformedStream.code(),
            "DBCHECK_TREE_MALFORMED_STREAM"
        );
        assert_eq!(
            TreeErrorCode::CapacityExceeded.code(),
            "DBCHECK_TREE_CAPACITY_EXCEEDED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = TreeError::malformed(3, "depth jumps from 1 to 3");
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("DBCHECK_TREE_MALFORMED_STREAM"));
        assert!(display.contains("event 3"));
        assert_eq!(err.event_index(), Some(3));
    }
}
