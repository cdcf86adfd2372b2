//! Container opening errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or enumerating a container
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Nothing openable at the path
    #[error("container not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The object exists but is not a database or table
    #[error("{path}: expected a database or table, found {found}")]
    WrongType {
        /// Where the object was found
        path: PathBuf,
        /// What was found instead
        found: String,
    },

    /// The container could not be decoded
    #[error("{path}: corrupt container: {reason}")]
    Corrupt {
        /// Container path
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Underlying I/O failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Cause
        #[source]
        source: io::Error,
    },
}

impl ContainerError {
    /// Builds a `Corrupt` error
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ContainerError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Builds an `Io` error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ContainerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;
