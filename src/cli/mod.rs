//! CLI module for dbcheck
//!
//! Provides command-line interface for:
//! - validate: Check databases and tables, exit nonzero on any failure
//! - tree: Print the reconstructed object tree of a container

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ValidateArgs, YesNo};
pub use commands::{load_config, run, run_command, tree, validate, RunError, RunSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_value};
