//! Container manifest format
//!
//! A container is described by one JSON document:
//!
//! ```json
//! {
//!   "kind": "database",
//!   "name": "SRR000001",
//!   "schema": "NCBI:align:db:alignment_sorted#1.3",
//!   "tables": [
//!     {
//!       "name": "SEQUENCE",
//!       "columns": [
//!         {
//!           "name": "PRIMARY_ALIGNMENT_ID",
//!           "elem_bits": 64,
//!           "first_row": 1,
//!           "rows": [[1, 2], null, [3, 0]],
//!           "crc32": "crc32:9ae0daaf",
//!           "sha256": "5f1c..."
//!         }
//!       ],
//!       "indices": [{ "name": "skey", "entries": ["a", "b"], "sha256": "..." }]
//!     }
//!   ],
//!   "databases": []
//! }
//! ```
//!
//! `null` rows are absent (sparse). Digests cover the little-endian encoding
//! of all present rows, in row order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::checksum::{compute_checksum, format_checksum, sha256_hex};
use super::errors::{ContainerError, ContainerResult};

/// Root of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Manifest {
    /// A database root
    Database(DatabaseManifest),
    /// A stand-alone table root
    Table(TableManifest),
}

impl Manifest {
    /// Parses a manifest, checking the declared kind first
    pub fn parse(path: &Path, text: &str) -> ContainerResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ContainerError::corrupt(path, format!("invalid manifest JSON: {}", e)))?;

        match value.get("kind").and_then(Value::as_str) {
            Some("database") | Some("table") => serde_json::from_value(value)
                .map_err(|e| ContainerError::corrupt(path, format!("invalid manifest: {}", e))),
            Some(found @ ("column" | "index")) => Err(ContainerError::WrongType {
                path: path.to_path_buf(),
                found: found.to_string(),
            }),
            Some(other) => Err(ContainerError::corrupt(
                path,
                format!("unknown object kind '{}'", other),
            )),
            None => Err(ContainerError::corrupt(path, "manifest has no kind")),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> ContainerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ContainerError::corrupt("<memory>", e.to_string()))
    }
}

/// A database and everything below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseManifest {
    /// Database name
    pub name: String,
    /// Declared schema, possibly with a `#version` suffix
    #[serde(default)]
    pub schema: String,
    /// Tables, in visitation order
    #[serde(default)]
    pub tables: Vec<TableManifest>,
    /// Nested databases, visited after the tables
    #[serde(default)]
    pub databases: Vec<DatabaseManifest>,
    /// Stray components found alongside the database
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// A table and its columns and indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Table name
    pub name: String,
    /// Declared schema
    #[serde(default)]
    pub schema: String,
    /// Columns, in visitation order
    #[serde(default)]
    pub columns: Vec<ColumnManifest>,
    /// Indices, visited after the columns
    #[serde(default)]
    pub indices: Vec<IndexManifest>,
    /// Stray components found alongside the table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// A column's cells and digests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnManifest {
    /// Column name
    pub name: String,
    /// Element width: 8, 16, 32 or 64 (default 64)
    #[serde(default = "default_elem_bits")]
    pub elem_bits: u32,
    /// Row id of the first entry in `rows` (default 1)
    #[serde(default = "default_first_row")]
    pub first_row: i64,
    /// One entry per row id; `None` for an absent row
    #[serde(default)]
    pub rows: Vec<Option<Vec<i64>>>,
    /// Blob CRC32, `crc32:xxxxxxxx`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32: Option<String>,
    /// Component SHA-256, lowercase hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

fn default_elem_bits() -> u32 {
    64
}
fn default_first_row() -> i64 {
    1
}

/// An index and its digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Index name
    pub name: String,
    /// Index keys
    #[serde(default)]
    pub entries: Vec<String>,
    /// SHA-256 over the newline-joined keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// One encoded cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCell {
    /// Number of elements
    pub count: u32,
    /// Little-endian element bytes
    pub bytes: Vec<u8>,
}

/// A column's encoded cells plus the byte stream its digests cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedColumn {
    /// One entry per row id
    pub cells: Vec<Option<EncodedCell>>,
    /// Concatenation of every present cell
    pub data: Vec<u8>,
}

impl ColumnManifest {
    /// A 64-bit column starting at `first_row`
    pub fn new(name: impl Into<String>, first_row: i64, rows: Vec<Option<Vec<i64>>>) -> Self {
        Self {
            name: name.into(),
            elem_bits: 64,
            first_row,
            rows,
            crc32: None,
            sha256: None,
        }
    }

    /// Encodes every cell at `elem_bits`
    ///
    /// Fails on an unsupported width or a value that does not fit it.
    pub fn encode(&self) -> Result<EncodedColumn, String> {
        let width = match self.elem_bits {
            8 | 16 | 32 | 64 => (self.elem_bits / 8) as usize,
            other => return Err(format!("unsupported element width {}", other)),
        };

        let mut cells = Vec::with_capacity(self.rows.len());
        let mut data = Vec::new();
        for (offset, row) in self.rows.iter().enumerate() {
            let Some(values) = row else {
                cells.push(None);
                continue;
            };
            let count = u32::try_from(values.len())
                .map_err(|_| format!("row {} has too many elements", offset))?;
            let mut bytes = Vec::with_capacity(values.len() * width);
            for value in values {
                encode_value(*value, width, &mut bytes).ok_or_else(|| {
                    format!(
                        "value {} at row offset {} does not fit in {} bits",
                        value, offset, self.elem_bits
                    )
                })?;
            }
            data.extend_from_slice(&bytes);
            cells.push(Some(EncodedCell { count, bytes }));
        }

        Ok(EncodedColumn { cells, data })
    }

    /// Fills in `crc32` and `sha256` from the current rows
    pub fn with_digests(mut self) -> Result<Self, String> {
        let encoded = self.encode()?;
        self.crc32 = Some(format_checksum(compute_checksum(&encoded.data)));
        self.sha256 = Some(sha256_hex(&encoded.data));
        Ok(self)
    }
}

fn encode_value(value: i64, width: usize, out: &mut Vec<u8>) -> Option<()> {
    match width {
        1 => out.extend_from_slice(&i8::try_from(value).ok()?.to_le_bytes()),
        2 => out.extend_from_slice(&i16::try_from(value).ok()?.to_le_bytes()),
        4 => out.extend_from_slice(&i32::try_from(value).ok()?.to_le_bytes()),
        _ => out.extend_from_slice(&value.to_le_bytes()),
    }
    Some(())
}

impl IndexManifest {
    /// Bytes the index digest covers
    pub fn digest_input(&self) -> Vec<u8> {
        self.entries.join("\n").into_bytes()
    }

    /// Fills in `sha256` from the current entries
    pub fn with_digest(mut self) -> Self {
        self.sha256 = Some(sha256_hex(&self.digest_input()));
        self
    }
}
