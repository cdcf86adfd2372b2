//! CLI-specific error types
//!
//! Any CLI error ends the process with a nonzero exit code.

use std::fmt;
use std::io;

use crate::container::ContainerError;
use crate::validate::ValidateError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or flag error
    ConfigError,
    /// I/O error (stdout, filesystem)
    IoError,
    /// A container could not be opened
    OpenFailed,
    /// A validation run aborted
    RunAborted,
    /// At least one object failed validation
    ValidationFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DBCHECK_CLI_CONFIG_ERROR",
            Self::IoError => "DBCHECK_CLI_IO_ERROR",
            Self::OpenFailed => "DBCHECK_CLI_OPEN_FAILED",
            Self::RunAborted => "DBCHECK_CLI_RUN_ABORTED",
            Self::ValidationFailed => "DBCHECK_CLI_VALIDATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Validation failed for `failed` of `total` objects
    pub fn validation_failed(failed: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::ValidationFailed,
            format!("{} of {} objects failed validation", failed, total),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        Self::new(CliErrorCode::OpenFailed, e.to_string())
    }
}

impl From<ValidateError> for CliError {
    fn from(e: ValidateError) -> Self {
        use crate::validate::ValidateErrorCode;
        match e.code() {
            ValidateErrorCode::ConfigInvalid => Self::config_error(e.message()),
            _ => Self::new(CliErrorCode::RunAborted, e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_code() {
        let err = CliError::validation_failed(1, 3);
        assert_eq!(
            err.to_string(),
            "DBCHECK_CLI_VALIDATION_FAILED: 1 of 3 objects failed validation"
        );
    }

    #[test]
    fn test_from_validate_error() {
        let err: CliError = ValidateError::config_invalid("bad").into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);

        let err: CliError = ValidateError::interrupted("stop").into();
        assert_eq!(err.code_str(), "DBCHECK_CLI_RUN_ABORTED");
    }
}
