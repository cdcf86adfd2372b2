//! CLI argument definitions using clap
//!
//! Commands:
//! - dbcheck validate [flags] <PATH>...
//! - dbcheck tree <PATH>

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::validate::ValidateConfig;

/// dbcheck - read-only consistency validator for column-oriented containers
#[derive(Parser, Debug)]
#[command(name = "dbcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate databases and tables
    Validate(ValidateArgs),

    /// Print the reconstructed object tree of one container as JSON
    Tree {
        /// Container to walk
        path: PathBuf,
    },
}

/// Switch value for the `-B` and `-I` options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// True for `yes`
    pub fn enabled(self) -> bool {
        self == YesNo::Yes
    }
}

#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verify blob CRC32s
    #[arg(short = 'B', long = "blob-crc", value_enum)]
    pub blob_crc: Option<YesNo>,

    /// Check referential integrity of alignment databases
    #[arg(short = 'I', long = "referential-integrity", value_enum)]
    pub referential_integrity: Option<YesNo>,

    /// Also verify index digests
    #[arg(long)]
    pub index: bool,

    /// Verify indices only
    #[arg(long)]
    pub index_only: bool,

    /// Stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Treat a missing component checksum as a failure
    #[arg(long)]
    pub require_checksums: bool,

    /// Skip the reverse coverage pass of the integrity check
    #[arg(long)]
    pub no_coverage: bool,

    /// Chunk working-set ceiling in bytes
    #[arg(long)]
    pub memory_ceiling: Option<u64>,

    /// Minimum logged severity: trace, info, warn, error or fatal
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print every report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Databases, tables or directories to search
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl ValidateArgs {
    /// Overrides `config` with every flag given on the command line
    pub fn apply(&self, config: &mut ValidateConfig) {
        if let Some(blob_crc) = self.blob_crc {
            config.blob_crc = blob_crc.enabled();
        }
        if let Some(integrity) = self.referential_integrity {
            config.referential_integrity = integrity.enabled();
        }
        config.index_check |= self.index;
        config.index_only |= self.index_only;
        config.fail_fast |= self.fail_fast;
        config.checksums_required |= self.require_checksums;
        if self.no_coverage {
            config.coverage_pass = false;
        }
        if let Some(ceiling) = self.memory_ceiling {
            config.memory_ceiling_bytes = ceiling;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
