//! Validation run configuration
//!
//! Loaded once, optionally from a JSON file, then frozen for the run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ValidateError, ValidateResult};
use crate::integrity::DEFAULT_MEMORY_CEILING;
use crate::observability::Severity;
use crate::visit::{CheckLevel, VisitOptions};

/// Strictness switches and resource limits for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Stop after the first failing check or relationship
    #[serde(default)]
    pub fail_fast: bool,

    /// Check referential integrity of alignment databases (default: true)
    #[serde(default = "default_true")]
    pub referential_integrity: bool,

    /// Read every listed id back on the "many" side (default: true)
    #[serde(default = "default_true")]
    pub coverage_pass: bool,

    /// Verify blob CRC32s (default: true)
    #[serde(default = "default_true")]
    pub blob_crc: bool,

    /// Verify index digests
    #[serde(default)]
    pub index_check: bool,

    /// Verify indices only
    #[serde(default)]
    pub index_only: bool,

    /// Treat a missing component checksum as a failure
    #[serde(default)]
    pub checksums_required: bool,

    /// Chunk working-set ceiling in bytes (default: 2 GiB)
    #[serde(default = "default_memory_ceiling")]
    pub memory_ceiling_bytes: u64,

    /// Minimum logged severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}
fn default_memory_ceiling() -> u64 {
    DEFAULT_MEMORY_CEILING
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            referential_integrity: true,
            coverage_pass: true,
            blob_crc: true,
            index_check: false,
            index_only: false,
            checksums_required: false,
            memory_ceiling_bytes: DEFAULT_MEMORY_CEILING,
            log_level: default_log_level(),
        }
    }
}

impl ValidateConfig {
    /// Loads and validates a configuration file
    pub fn load(path: &Path) -> ValidateResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ValidateError::config_invalid(format!(
                "failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ValidateConfig = serde_json::from_str(&content)
            .map_err(|e| ValidateError::config_invalid(format!("invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects unusable values
    pub fn validate(&self) -> ValidateResult<()> {
        if self.memory_ceiling_bytes == 0 {
            return Err(ValidateError::config_invalid(
                "memory_ceiling_bytes must be > 0",
            ));
        }
        self.log_severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> ValidateResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ValidateError::config_invalid(format!(
                "invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }

    /// Physical check depth requested from the container
    pub fn check_level(&self) -> CheckLevel {
        CheckLevel::from_flags(self.blob_crc, self.index_check)
    }

    /// Options handed to the visitation source
    pub fn visit_options(&self) -> VisitOptions {
        VisitOptions {
            level: self.check_level(),
            index_only: self.index_only,
        }
    }
}
