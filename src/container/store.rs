//! In-memory container decoded from a manifest
//!
//! Column cells are encoded once at load time. The container walks itself
//! in pre-order for visitation and serves row cursors over its top-level
//! tables for the integrity checker.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use super::checksum::{compute_checksum, format_checksum, parse_checksum, sha256_hex};
use super::errors::{ContainerError, ContainerResult};
use super::manifest::{
    ColumnManifest, DatabaseManifest, EncodedCell, IndexManifest, Manifest, TableManifest,
};
use super::Container;
use crate::integrity::{CellView, ColumnId, CursorError, CursorResult, RowCursor, RowRange, RowSetSource};
use crate::validate::ValidateResult;
use crate::visit::{
    Census, CheckLevel, FailureCode, ObjectKind, VisitOptions, VisitReport, VisitSink,
    VisitSource, MISSING_CHECKSUMS, UNEXPECTED_OBJECT_PREFIX,
};

/// Returns early from the enclosing walk when the sink asks to stop
macro_rules! forward {
    ($flow:expr) => {
        if $flow?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    };
}

/// A decoded database or table
#[derive(Debug, Clone)]
pub struct ManifestContainer {
    path: PathBuf,
    root: Root,
}

#[derive(Debug, Clone)]
enum Root {
    Database(StoredDatabase),
    Table(StoredTable),
}

#[derive(Debug, Clone)]
struct StoredDatabase {
    name: String,
    schema: String,
    tables: Vec<StoredTable>,
    databases: Vec<StoredDatabase>,
    extra: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredTable {
    name: String,
    schema: String,
    columns: Vec<StoredColumn>,
    indices: Vec<IndexManifest>,
    extra: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredColumn {
    name: String,
    elem_bits: u32,
    first_row: i64,
    cells: Vec<Option<EncodedCell>>,
    data: Vec<u8>,
    crc32: Option<String>,
    sha256: Option<String>,
}

impl ManifestContainer {
    /// Decodes a parsed manifest
    pub fn from_manifest(path: impl Into<PathBuf>, manifest: Manifest) -> ContainerResult<Self> {
        let path = path.into();
        let root = match manifest {
            Manifest::Database(db) => Root::Database(load_database(&path, db)?),
            Manifest::Table(table) => Root::Table(load_table(&path, table)?),
        };
        Ok(Self { path, root })
    }

    /// Parses and decodes manifest text
    pub fn from_json(path: impl Into<PathBuf>, text: &str) -> ContainerResult<Self> {
        let path = path.into();
        let manifest = Manifest::parse(&path, text)?;
        Self::from_manifest(path, manifest)
    }

    /// Where the container was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn top_level_table(&self, name: &str) -> Option<&StoredTable> {
        match &self.root {
            Root::Database(db) => db.tables.iter().find(|table| table.name == name),
            Root::Table(table) => (table.name == name).then_some(table),
        }
    }
}

fn load_database(path: &Path, db: DatabaseManifest) -> ContainerResult<StoredDatabase> {
    Ok(StoredDatabase {
        name: db.name,
        schema: db.schema,
        tables: db
            .tables
            .into_iter()
            .map(|table| load_table(path, table))
            .collect::<ContainerResult<_>>()?,
        databases: db
            .databases
            .into_iter()
            .map(|nested| load_database(path, nested))
            .collect::<ContainerResult<_>>()?,
        extra: db.extra,
    })
}

fn load_table(path: &Path, table: TableManifest) -> ContainerResult<StoredTable> {
    let columns = table
        .columns
        .into_iter()
        .map(|column| load_column(path, &table.name, column))
        .collect::<ContainerResult<_>>()?;
    Ok(StoredTable {
        name: table.name,
        schema: table.schema,
        columns,
        indices: table.indices,
        extra: table.extra,
    })
}

fn load_column(path: &Path, table: &str, column: ColumnManifest) -> ContainerResult<StoredColumn> {
    let encoded = column
        .encode()
        .map_err(|reason| ContainerError::corrupt(path, format!("{}.{}: {}", table, column.name, reason)))?;
    Ok(StoredColumn {
        name: column.name,
        elem_bits: column.elem_bits,
        first_row: column.first_row,
        cells: encoded.cells,
        data: encoded.data,
        crc32: column.crc32,
        sha256: column.sha256,
    })
}

// ==================
// Census
// ==================

fn count_database(db: &StoredDatabase, census: &mut Census) {
    census.record(&db.name);
    for table in &db.tables {
        count_table(table, census);
    }
    for nested in &db.databases {
        count_database(nested, census);
    }
}

fn count_table(table: &StoredTable, census: &mut Census) {
    census.record(&table.name);
    for column in &table.columns {
        census.record(&column.name);
    }
    for index in &table.indices {
        census.record(&index.name);
    }
}

// ==================
// Walk
// ==================

fn walk_database(
    db: &StoredDatabase,
    depth: u32,
    options: VisitOptions,
    sink: &mut dyn VisitSink,
) -> ValidateResult<ControlFlow<()>> {
    forward!(sink.report(VisitReport::visit(&db.name, ObjectKind::Database, depth)));
    for table in &db.tables {
        forward!(walk_table(table, depth + 1, options, sink));
    }
    for nested in &db.databases {
        forward!(walk_database(nested, depth + 1, options, sink));
    }
    for stray in &db.extra {
        forward!(sink.report(unexpected(ObjectKind::Database, &db.name, stray)));
    }
    sink.report(VisitReport::done(ObjectKind::Database, &db.name))
}

fn walk_table(
    table: &StoredTable,
    depth: u32,
    options: VisitOptions,
    sink: &mut dyn VisitSink,
) -> ValidateResult<ControlFlow<()>> {
    forward!(sink.report(VisitReport::visit(&table.name, ObjectKind::Table, depth)));

    for column in &table.columns {
        forward!(sink.report(VisitReport::visit(&column.name, ObjectKind::Column, depth + 1)));
        if !options.index_only {
            forward!(sink.report(check_column(column, options.level)));
        }
    }

    let verify_indices = options.index_only || options.level >= CheckLevel::Index;
    for index in &table.indices {
        forward!(sink.report(VisitReport::visit(&index.name, ObjectKind::Index, depth + 1)));
        forward!(sink.report(check_index(index, verify_indices)));
    }

    if !options.index_only {
        for column in &table.columns {
            if let Some(expected) = &column.sha256 {
                forward!(sink.report(VisitReport::Checksum {
                    kind: ObjectKind::Table,
                    object: table.name.clone(),
                    file: format!("col/{}/data", column.name),
                    passed: sha256_hex(&column.data) == *expected,
                }));
            }
        }
    }

    for stray in &table.extra {
        forward!(sink.report(unexpected(ObjectKind::Table, &table.name, stray)));
    }

    let unsummed = !options.index_only
        && !table.columns.is_empty()
        && table.columns.iter().all(|column| column.sha256.is_none());
    sink.report(VisitReport::Done {
        kind: ObjectKind::Table,
        object: table.name.clone(),
        failure: None,
        message: unsummed.then(|| MISSING_CHECKSUMS.to_string()),
    })
}

fn check_column(column: &StoredColumn, level: CheckLevel) -> VisitReport {
    if level < CheckLevel::BlobCrc {
        return VisitReport::done(ObjectKind::Column, &column.name);
    }
    let Some(recorded) = &column.crc32 else {
        return VisitReport::done(ObjectKind::Column, &column.name);
    };
    let Some(expected) = parse_checksum(recorded) else {
        return VisitReport::failed(
            ObjectKind::Column,
            &column.name,
            FailureCode::Corrupt,
            format!("malformed blob checksum '{}'", recorded),
        );
    };

    let actual = compute_checksum(&column.data);
    if actual == expected {
        VisitReport::done(ObjectKind::Column, &column.name)
    } else {
        VisitReport::failed(
            ObjectKind::Column,
            &column.name,
            FailureCode::CrcMismatch,
            format!(
                "blob checksum mismatch: recorded {}, computed {}",
                recorded,
                format_checksum(actual)
            ),
        )
    }
}

fn check_index(index: &IndexManifest, verify: bool) -> VisitReport {
    match (&index.sha256, verify) {
        (Some(expected), true) if sha256_hex(&index.digest_input()) != *expected => {
            VisitReport::failed(
                ObjectKind::Index,
                &index.name,
                FailureCode::ChecksumMismatch,
                "index digest mismatch",
            )
        }
        _ => VisitReport::done(ObjectKind::Index, &index.name),
    }
}

fn unexpected(kind: ObjectKind, owner: &str, stray: &str) -> VisitReport {
    VisitReport::Done {
        kind,
        object: owner.to_string(),
        failure: None,
        message: Some(format!("{}{}", UNEXPECTED_OBJECT_PREFIX, stray)),
    }
}

impl VisitSource for ManifestContainer {
    fn census(&self) -> ContainerResult<Census> {
        let mut census = Census::default();
        match &self.root {
            Root::Database(db) => count_database(db, &mut census),
            Root::Table(table) => count_table(table, &mut census),
        }
        Ok(census)
    }

    fn visit(&self, options: VisitOptions, sink: &mut dyn VisitSink) -> ValidateResult<()> {
        // a sink that stops the walk early is not an error
        let _flow = match &self.root {
            Root::Database(db) => walk_database(db, 0, options, sink)?,
            Root::Table(table) => walk_table(table, 0, options, sink)?,
        };
        Ok(())
    }
}

// ==================
// Row cursors
// ==================

/// Cursor over one stored table
pub struct ManifestCursor<'a> {
    table: &'a StoredTable,
    columns: Vec<&'a StoredColumn>,
}

impl ManifestCursor<'_> {
    fn column(&self, id: ColumnId) -> CursorResult<&StoredColumn> {
        self.columns
            .get(id.0 as usize)
            .copied()
            .ok_or_else(|| CursorError::Read(format!("{}: no column handle {}", self.table.name, id.0)))
    }
}

impl RowCursor for ManifestCursor<'_> {
    fn add_column(&mut self, name: &str) -> CursorResult<ColumnId> {
        let column = self
            .table
            .columns
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| CursorError::ColumnNotFound(format!("{}.{}", self.table.name, name)))?;
        let id = u32::try_from(self.columns.len())
            .map_err(|_| CursorError::Read("too many columns".to_string()))?;
        self.columns.push(column);
        Ok(ColumnId(id))
    }

    fn id_range(&self, column: ColumnId) -> CursorResult<RowRange> {
        let column = self.column(column)?;
        Ok(RowRange::new(column.first_row, column.cells.len() as u64))
    }

    fn cell(&mut self, column: ColumnId, row: i64) -> CursorResult<CellView<'_>> {
        let column = self.column(column)?;
        let cell = row
            .checked_sub(column.first_row)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| column.cells.get(offset))
            .and_then(Option::as_ref)
            .ok_or(CursorError::RowNotFound { row })?;
        Ok(CellView::new(column.elem_bits, cell.count, &cell.bytes))
    }
}

impl RowSetSource for ManifestContainer {
    fn open_row_set(&self, name: &str) -> CursorResult<Box<dyn RowCursor + '_>> {
        let table = self
            .top_level_table(name)
            .ok_or_else(|| CursorError::TableNotFound(name.to_string()))?;
        Ok(Box::new(ManifestCursor {
            table,
            columns: Vec::new(),
        }))
    }
}

impl Container for ManifestContainer {
    fn kind(&self) -> ObjectKind {
        match self.root {
            Root::Database(_) => ObjectKind::Database,
            Root::Table(_) => ObjectKind::Table,
        }
    }

    fn name(&self) -> &str {
        match &self.root {
            Root::Database(db) => &db.name,
            Root::Table(table) => &table.name,
        }
    }

    fn schema_name(&self) -> &str {
        match &self.root {
            Root::Database(db) => &db.schema,
            Root::Table(table) => &table.schema,
        }
    }
}
