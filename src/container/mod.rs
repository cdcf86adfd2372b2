//! Containers: the databases and tables being validated
//!
//! A container walks itself for the visitation phase and hands out row
//! cursors for the integrity phase. The on-disk form is a JSON manifest,
//! either bare, inside a directory, or inside a tar archive.

mod checksum;
mod discover;
mod errors;
mod manifest;
mod opener;
mod store;

pub use checksum::{compute_checksum, format_checksum, parse_checksum, sha256_hex};
pub use discover::discover;
pub use errors::{ContainerError, ContainerResult};
pub use manifest::{
    ColumnManifest, DatabaseManifest, EncodedCell, EncodedColumn, IndexManifest, Manifest,
    TableManifest,
};
pub use opener::{open, MANIFEST_FILE_NAME};
pub use store::{ManifestContainer, ManifestCursor};

use crate::integrity::RowSetSource;
use crate::visit::{ObjectKind, VisitSource};

/// An opened top-level database or table
pub trait Container: VisitSource + RowSetSource {
    /// Kind of the top-level object
    fn kind(&self) -> ObjectKind;

    /// Name of the top-level object
    fn name(&self) -> &str;

    /// Declared schema name, possibly empty
    fn schema_name(&self) -> &str;
}
