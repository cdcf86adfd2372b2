//! JSON output for the CLI
//!
//! - Output: one JSON document on stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write a raw JSON string to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}

/// Serialize `value` and write it to stdout
pub fn write_value<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    write_json(&serde_json::to_string_pretty(value)?)
}
