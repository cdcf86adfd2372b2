//! Validation run errors
//!
//! These abort the run for one object. Integrity findings are never errors;
//! they are reported as verdicts.
//!
//! Error codes:
//! - DBCHECK_CONTRACT_VIOLATION (FATAL)
//! - DBCHECK_CONTAINER_UNREADABLE (ERROR)
//! - DBCHECK_INTERRUPTED (ERROR)
//! - DBCHECK_CONFIG_INVALID (FATAL)

use std::fmt;

use crate::container::ContainerError;
use crate::tree::TreeError;

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The object could not be validated; other objects may proceed
    Error,
    /// The run cannot continue at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateErrorCode {
    /// A collaborator broke its contract (malformed stream, census mismatch)
    ContractViolation,
    /// The container could not be opened or enumerated
    ContainerUnreadable,
    /// The stop flag was raised
    Interrupted,
    /// The configuration is unusable
    ConfigInvalid,
}

impl ValidateErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidateErrorCode::ContractViolation => "DBCHECK_CONTRACT_VIOLATION",
            ValidateErrorCode::ContainerUnreadable => "DBCHECK_CONTAINER_UNREADABLE",
            ValidateErrorCode::Interrupted => "DBCHECK_INTERRUPTED",
            ValidateErrorCode::ConfigInvalid => "DBCHECK_CONFIG_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ValidateErrorCode::ContractViolation | ValidateErrorCode::ConfigInvalid => {
                Severity::Fatal
            }
            ValidateErrorCode::ContainerUnreadable | ValidateErrorCode::Interrupted => {
                Severity::Error
            }
        }
    }
}

impl fmt::Display for ValidateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation error with context
#[derive(Debug)]
pub struct ValidateError {
    code: ValidateErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ValidateError {
    fn new(code: ValidateErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Contract violation by a collaborator
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ValidateErrorCode::ContractViolation, message)
    }

    /// Container could not be read
    pub fn container_unreadable(message: impl Into<String>) -> Self {
        Self::new(ValidateErrorCode::ContainerUnreadable, message)
    }

    /// Run stopped on request
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::new(ValidateErrorCode::Interrupted, message)
    }

    /// Configuration rejected
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ValidateErrorCode::ConfigInvalid, message)
    }

    /// Returns the error code
    pub fn code(&self) -> ValidateErrorCode {
        self.code
    }

    /// Returns the severity
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when no further object should be attempted
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)
    }
}

impl std::error::Error for ValidateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<TreeError> for ValidateError {
    fn from(err: TreeError) -> Self {
        Self {
            code: ValidateErrorCode::ContractViolation,
            message: err.message().to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ContainerError> for ValidateError {
    fn from(err: ContainerError) -> Self {
        Self {
            code: ValidateErrorCode::ContainerUnreadable,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type for validation runs
pub type ValidateResult<T> = Result<T, ValidateError>;
