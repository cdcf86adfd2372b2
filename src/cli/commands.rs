//! CLI command implementations
//!
//! `validate` expands every path into containers, validates each one under a
//! single frozen configuration and fails the process if any object fails.
//! An object that cannot be opened is counted as failed; the remaining
//! objects are still validated. An interrupted run aborts immediately.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::container::{discover, open, Container};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::report::{LogSink, ValidationReport};
use crate::validate::{ValidateConfig, ValidateError, ValidateErrorCode, Validator};

use super::args::{Cli, Command, ValidateArgs};
use super::errors::{CliError, CliResult};
use super::io::write_value;

/// Outcome of one `validate` invocation
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// One report per validated object
    pub reports: Vec<ValidationReport>,
    /// Objects that could not be validated, with the reason
    pub errors: Vec<RunError>,
}

/// An object that could not be validated
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    /// Where the object was found
    pub path: PathBuf,
    /// Error code
    pub code: String,
    /// Error text
    pub message: String,
}

impl RunSummary {
    /// Number of objects attempted
    pub fn total(&self) -> usize {
        self.reports.len() + self.errors.len()
    }

    /// Number of objects that failed or could not be validated
    pub fn failed(&self) -> usize {
        self.errors.len() + self.reports.iter().filter(|r| !r.passed()).count()
    }

    /// True when every object passed
    pub fn passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Validate(args) => {
            let summary = validate(&args)?;
            if summary.passed() {
                Ok(())
            } else {
                Err(CliError::validation_failed(summary.failed(), summary.total()))
            }
        }
        Command::Tree { path } => tree(&path),
    }
}

/// Builds the run configuration from the optional file and the flags
pub fn load_config(args: &ValidateArgs) -> CliResult<ValidateConfig> {
    let mut config = match &args.config {
        Some(path) => ValidateConfig::load(path)?,
        None => ValidateConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// `dbcheck validate`
pub fn validate(args: &ValidateArgs) -> CliResult<RunSummary> {
    let config = load_config(args)?;
    Logger::set_threshold(config.log_severity()?);
    let source = args
        .config
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("fail_fast", bool_str(config.fail_fast)),
            ("level", check_level_str(&config)),
            ("referential_integrity", bool_str(config.referential_integrity)),
            ("source", source.as_str()),
        ],
    );

    let validator = Validator::new(&config);
    let mut summary = RunSummary::default();

    for path in &args.paths {
        let found = match discover(path) {
            Ok(found) => found,
            Err(e) => {
                summary.errors.push(run_error(path, "DBCHECK_CONTAINER_UNREADABLE", e.to_string()));
                continue;
            }
        };
        let count = found.len().to_string();
        let path_text = path.display().to_string();
        log_event_with_fields(
            Event::DiscoveryComplete,
            &[("containers", count.as_str()), ("path", path_text.as_str())],
        );

        for container_path in found {
            match validate_one(&validator, &container_path) {
                Ok(report) => summary.reports.push(report),
                Err(e) if e.code() == ValidateErrorCode::Interrupted => {
                    log_event_with_fields(Event::RunInterrupted, &[("run_id", validator.run_id())]);
                    return Err(e.into());
                }
                Err(e) => {
                    if e.code() == ValidateErrorCode::ContractViolation {
                        let path_text = container_path.display().to_string();
                        log_event_with_fields(
                            Event::ContractViolation,
                            &[("path", path_text.as_str()), ("reason", e.message())],
                        );
                    }
                    summary
                        .errors
                        .push(run_error(&container_path, e.code().code(), e.message().to_string()));
                }
            }
        }
    }

    if args.json {
        write_value(&summary)?;
    }
    Ok(summary)
}

fn validate_one(validator: &Validator<'_>, path: &Path) -> Result<ValidationReport, ValidateError> {
    let container = open(path)?;
    let path_text = path.display().to_string();
    log_event_with_fields(
        Event::ContainerOpened,
        &[
            ("kind", container.kind().as_str()),
            ("object", container.name()),
            ("path", path_text.as_str()),
        ],
    );
    validator.validate(path, &container, &mut LogSink)
}

/// `dbcheck tree`
pub fn tree(path: &Path) -> CliResult<()> {
    let container = open(path)?;
    let config = ValidateConfig::default();
    let tree = Validator::new(&config).build_tree(&container)?;
    write_value(&tree.outline(tree.root()))
}

fn run_error(path: &Path, code: &str, message: String) -> RunError {
    RunError {
        path: path.to_path_buf(),
        code: code.to_string(),
        message,
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn check_level_str(config: &ValidateConfig) -> &'static str {
    use crate::visit::CheckLevel;
    match config.check_level() {
        CheckLevel::Metadata => "metadata",
        CheckLevel::BlobCrc => "blob_crc",
        CheckLevel::Index => "index",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GOOD_TABLE: &str = r#"{
        "kind": "table",
        "name": "run",
        "columns": [
            {"name": "READ", "rows": [[1]]},
            {"name": "QUALITY", "rows": [[30]]},
            {"name": "SPOT_LEN", "rows": [[1]]}
        ]
    }"#;

    fn args(paths: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            paths,
            log_level: Some("fatal".to_string()),
            ..ValidateArgs::default()
        }
    }

    #[test]
    fn test_validate_good_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.json");
        fs::write(&path, GOOD_TABLE).unwrap();

        let summary = validate(&args(vec![path])).unwrap();
        assert!(summary.passed());
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn test_unopenable_object_counts_as_failed() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("a.json");
        fs::write(&good, GOOD_TABLE).unwrap();
        let bad = temp.path().join("b.json");
        fs::write(&bad, "{oops").unwrap();

        let summary = validate(&args(vec![temp.path().to_path_buf()])).unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errors[0].path, bad);
    }

    #[test]
    fn test_missing_path_is_reported() {
        let temp = TempDir::new().unwrap();
        let summary = validate(&args(vec![temp.path().join("gone")])).unwrap();
        assert!(!summary.passed());
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let mut bad = args(vec![PathBuf::from("x")]);
        bad.log_level = Some("loud".to_string());
        assert!(load_config(&bad).is_err());

        let mut bad = args(vec![PathBuf::from("x")]);
        bad.memory_ceiling = Some(0);
        assert!(load_config(&bad).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("dbcheck.json");
        fs::write(&config_path, r#"{"fail_fast": true, "blob_crc": false}"#).unwrap();

        let mut with_file = args(vec![PathBuf::from("x")]);
        with_file.config = Some(config_path);
        with_file.index = true;
        let config = load_config(&with_file).unwrap();
        assert!(config.fail_fast);
        assert!(!config.blob_crc);
        assert!(config.index_check);
    }
}
