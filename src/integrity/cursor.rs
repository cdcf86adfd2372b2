//! Row cursor contract consumed by the integrity checker

use std::iter::FusedIterator;

use thiserror::Error;

/// Handle of a column added to a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub u32);

/// Contiguous row-id range covered by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First row id; need not be 0 or 1
    pub start: i64,
    /// Number of row ids in the range
    pub count: u64,
}

impl RowRange {
    /// Creates a range
    pub fn new(start: i64, count: u64) -> Self {
        Self { start, count }
    }

    /// One past the last row id, or `None` on overflow
    pub fn end(&self) -> Option<i64> {
        i64::try_from(self.count)
            .ok()
            .and_then(|count| self.start.checked_add(count))
    }
}

/// Errors raised by a row cursor
#[derive(Debug, Error)]
pub enum CursorError {
    /// The row is absent; sparse data, not a failure
    #[error("row {row} not found")]
    RowNotFound {
        /// Row id that was requested
        row: i64,
    },

    /// The column does not exist in the row-set
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// The row-set does not exist in the container
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Any other read failure
    #[error("read failed: {0}")]
    Read(String),
}

impl CursorError {
    /// True for the sparse-row signal
    pub fn is_row_not_found(&self) -> bool {
        matches!(self, CursorError::RowNotFound { .. })
    }
}

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Borrowed view of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView<'a> {
    /// Width of one element in bits
    pub elem_bits: u32,
    /// Number of elements
    pub elem_count: u32,
    /// Raw little-endian element bytes
    pub data: &'a [u8],
}

impl<'a> CellView<'a> {
    /// Creates a view
    pub fn new(elem_bits: u32, elem_count: u32, data: &'a [u8]) -> Self {
        Self {
            elem_bits,
            elem_count,
            data,
        }
    }

    /// Elements as 64-bit row ids
    ///
    /// `None` unless elements are 64 bits wide and the buffer holds exactly
    /// `elem_count` of them.
    pub fn ids(&self) -> Option<IdIter<'a>> {
        if self.elem_bits != 64 || self.data.len() != self.elem_count as usize * 8 {
            return None;
        }
        Some(IdIter {
            chunks: self.data.chunks_exact(8),
        })
    }
}

/// Iterator over the row ids of a 64-bit cell
#[derive(Debug, Clone)]
pub struct IdIter<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
}

impl Iterator for IdIter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.chunks.next().map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            i64::from_le_bytes(bytes)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for IdIter<'_> {}

impl FusedIterator for IdIter<'_> {}

/// Reads cells of one row-set by row id
pub trait RowCursor {
    /// Adds a column to the cursor
    fn add_column(&mut self, name: &str) -> CursorResult<ColumnId>;

    /// Row-id range covered by a column
    fn id_range(&self, column: ColumnId) -> CursorResult<RowRange>;

    /// Reads a cell, or `RowNotFound` for a sparse row
    fn cell(&mut self, column: ColumnId, row: i64) -> CursorResult<CellView<'_>>;
}
