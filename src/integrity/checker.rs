//! Pairwise referential-integrity check
//!
//! Verifies a "many" side holding one foreign key per row against a "one"
//! side holding, per row, the list of "many" rows that point at it.
//!
//! # Forward pass
//!
//! The "many" side's row range is cut into chunks sized by
//! [`work_chunk`](super::chunk::work_chunk). Each chunk is read into
//! `(key, origin)` pairs, sorted, and split into spans of equal key. Every
//! span is compared with the "one"-side cell at row `key`:
//!
//! - row missing, or fewer ids than the span: inconsistent
//! - more ids than the memory ceiling holds: skipped
//! - up to `SMALL_CELL` ids: nested scan
//! - otherwise sort a copy and compare exactly (equal sizes) or test the
//!   span as a subset of the cell
//!
//! # Coverage pass
//!
//! The forward pass never looks at ids a cell lists beyond its span's
//! members. Once it succeeds or skips, every non-zero id of every "one"-side
//! cell is read back on the "many" side and must point at the row that lists
//! it. The pass holds no buffers, so a skip stands only if it finds nothing.

use serde::Serialize;

use super::chunk::{work_chunk, ChunkBuffers, BYTES_PER_ROW};
use super::cursor::{CellView, ColumnId, CursorError, CursorResult, RowCursor};
use super::pairs::{id_pair_span, ChunkSorter, IdPair};
use crate::report::IntegrityVerdict;

/// Cells with at most this many ids are compared without sorting
pub const SMALL_CELL: usize = 4;

/// Counters gathered while checking one relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipStats {
    /// "Many"-side rows read successfully
    pub rows_scanned: u64,
    /// "Many"-side rows reported absent
    pub rows_absent: u64,
    /// Chunks processed
    pub chunks: u64,
    /// Spans compared
    pub spans: u64,
    /// Rows per chunk
    pub chunk_size: u64,
    /// "One"-side ids verified by the coverage pass
    pub ids_covered: u64,
}

/// Verdict plus counters for one relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Outcome
    pub verdict: IntegrityVerdict,
    /// Counters
    pub stats: RelationshipStats,
}

/// Checks one many-to-one relationship under a memory ceiling
#[derive(Debug, Clone, Copy)]
pub struct PairwiseIntegrityChecker {
    memory_ceiling: u64,
    coverage_pass: bool,
}

impl PairwiseIntegrityChecker {
    /// Creates a checker bounded by `memory_ceiling` bytes
    pub fn new(memory_ceiling: u64) -> Self {
        Self {
            memory_ceiling,
            coverage_pass: true,
        }
    }

    /// Enables or disables the coverage pass
    pub fn with_coverage_pass(mut self, enabled: bool) -> Self {
        self.coverage_pass = enabled;
        self
    }

    /// Runs the check
    ///
    /// Integrity findings come back as the verdict. `Err` is reserved for
    /// read failures other than row-not-found.
    pub fn check<M, O>(
        &self,
        many: &mut M,
        many_column: ColumnId,
        one: &mut O,
        one_column: ColumnId,
    ) -> CursorResult<CheckOutcome>
    where
        M: RowCursor + ?Sized,
        O: RowCursor + ?Sized,
    {
        let mut stats = RelationshipStats::default();

        let forward = self.forward_pass(many, many_column, one, one_column, &mut stats)?;
        let skipped = forward == IntegrityVerdict::SkippedTooLarge;
        if !(forward.is_ok() || skipped) || !self.coverage_pass {
            return Ok(CheckOutcome {
                verdict: forward,
                stats,
            });
        }

        let covered = coverage_pass(many, many_column, one, one_column, &mut stats)?;
        let verdict = if covered.is_ok() { forward } else { covered };
        Ok(CheckOutcome { verdict, stats })
    }

    /// Largest "one"-side cell the ceiling leaves room for
    fn cell_capacity(&self) -> usize {
        usize::try_from(self.memory_ceiling / BYTES_PER_ROW).unwrap_or(usize::MAX)
    }

    fn forward_pass<M, O>(
        &self,
        many: &mut M,
        many_column: ColumnId,
        one: &mut O,
        one_column: ColumnId,
        stats: &mut RelationshipStats,
    ) -> CursorResult<IntegrityVerdict>
    where
        M: RowCursor + ?Sized,
        O: RowCursor + ?Sized,
    {
        let range = many.id_range(many_column)?;
        if range.count == 0 {
            return Ok(IntegrityVerdict::Ok);
        }
        let end = range
            .end()
            .ok_or_else(|| CursorError::Read(format!("row range {:?} overflows", range)))?;

        let chunk = work_chunk(range.count, self.memory_ceiling);
        stats.chunk_size = chunk;
        let (Ok(chunk_rows), Ok(chunk_len)) = (usize::try_from(chunk), i64::try_from(chunk)) else {
            return Ok(IntegrityVerdict::SkippedTooLarge);
        };
        if chunk_rows == 0 {
            return Ok(IntegrityVerdict::SkippedTooLarge);
        }
        let Some(buffers) = ChunkBuffers::allocate(chunk_rows) else {
            return Ok(IntegrityVerdict::SkippedTooLarge);
        };
        let ChunkBuffers {
            mut pairs,
            mut scratch,
        } = buffers;

        let cell_capacity = self.cell_capacity();
        let mut row = range.start;
        while row < end {
            let chunk_end = row.saturating_add(chunk_len).min(end);

            pairs.clear();
            for origin in row..chunk_end {
                match many.cell(many_column, origin) {
                    Ok(cell) => match single_key(&cell) {
                        Some(key) => pairs.push(IdPair::new(key, origin)),
                        None => {
                            return Ok(IntegrityVerdict::Unexpected {
                                detail: format!(
                                    "foreign key at row {} has {} elements of {} bits",
                                    origin, cell.elem_count, cell.elem_bits
                                ),
                            })
                        }
                    },
                    Err(e) if e.is_row_not_found() => stats.rows_absent += 1,
                    Err(e) => return Err(e),
                }
            }
            stats.rows_scanned += pairs.len() as u64;
            stats.chunks += 1;

            ChunkSorter::sort(&mut pairs);

            let mut first = 0;
            while first < pairs.len() {
                let span = id_pair_span(&pairs, first);
                let verdict = compare_span(
                    one,
                    one_column,
                    &pairs[first..first + span],
                    &mut scratch,
                    cell_capacity,
                )?;
                stats.spans += 1;
                if !verdict.is_ok() {
                    return Ok(verdict);
                }
                first += span;
            }

            row = chunk_end;
        }

        Ok(IntegrityVerdict::Ok)
    }
}

/// The one foreign key held by a "many"-side cell
fn single_key(cell: &CellView<'_>) -> Option<i64> {
    if cell.elem_count != 1 {
        return None;
    }
    cell.ids()?.next()
}

/// Compares one span of equal-key pairs with the "one"-side cell at `key`
///
/// `span` is sorted by origin and its origins are distinct. `scratch` grows
/// on demand up to `capacity` ids.
fn compare_span<O>(
    one: &mut O,
    one_column: ColumnId,
    span: &[IdPair],
    scratch: &mut Vec<i64>,
    capacity: usize,
) -> CursorResult<IntegrityVerdict>
where
    O: RowCursor + ?Sized,
{
    let key = span[0].key;

    let cell = match one.cell(one_column, key) {
        Ok(cell) => cell,
        Err(e) if e.is_row_not_found() => {
            return Ok(IntegrityVerdict::Inconsistent {
                key,
                origins: span.iter().map(|pair| pair.origin).collect(),
            })
        }
        Err(e) => return Err(e),
    };
    let Some(ids) = cell.ids() else {
        return Ok(IntegrityVerdict::Unexpected {
            detail: format!(
                "id list at row {} has {} elements of {} bits",
                key, cell.elem_count, cell.elem_bits
            ),
        });
    };

    let count = ids.len();
    scratch.clear();
    if count > capacity || scratch.try_reserve(count).is_err() {
        return Ok(IntegrityVerdict::SkippedTooLarge);
    }
    scratch.extend(ids);

    let matched = if count < span.len() {
        false
    } else if count <= SMALL_CELL {
        span.iter().all(|pair| scratch.contains(&pair.origin))
    } else {
        ChunkSorter::sort_ids(scratch);
        if count == span.len() {
            scratch.iter().zip(span).all(|(id, pair)| *id == pair.origin)
        } else {
            is_subset(span, scratch)
        }
    };

    if matched {
        return Ok(IntegrityVerdict::Ok);
    }
    Ok(IntegrityVerdict::Inconsistent {
        key,
        origins: unmatched_origins(span, scratch),
    })
}

/// Merge test: every span origin appears in the sorted `ids`
fn is_subset(span: &[IdPair], ids: &[i64]) -> bool {
    let mut ids = ids.iter();
    for pair in span {
        loop {
            match ids.next() {
                Some(id) if *id == pair.origin => break,
                Some(id) if *id < pair.origin => continue,
                _ => return false,
            }
        }
    }
    true
}

/// Span origins missing from `ids`; the whole span if none can be isolated
fn unmatched_origins(span: &[IdPair], ids: &mut [i64]) -> Vec<i64> {
    ChunkSorter::sort_ids(ids);
    let missing: Vec<i64> = span
        .iter()
        .map(|pair| pair.origin)
        .filter(|origin| ids.binary_search(origin).is_err())
        .collect();
    if missing.is_empty() {
        span.iter().map(|pair| pair.origin).collect()
    } else {
        missing
    }
}

/// Reads every listed id back on the "many" side
///
/// Id 0 marks an absent reference and is skipped.
fn coverage_pass<M, O>(
    many: &mut M,
    many_column: ColumnId,
    one: &mut O,
    one_column: ColumnId,
    stats: &mut RelationshipStats,
) -> CursorResult<IntegrityVerdict>
where
    M: RowCursor + ?Sized,
    O: RowCursor + ?Sized,
{
    let range = one.id_range(one_column)?;
    if range.count == 0 {
        return Ok(IntegrityVerdict::Ok);
    }
    let end = range
        .end()
        .ok_or_else(|| CursorError::Read(format!("row range {:?} overflows", range)))?;

    for key in range.start..end {
        let cell = match one.cell(one_column, key) {
            Ok(cell) => cell,
            Err(e) if e.is_row_not_found() => continue,
            Err(e) => return Err(e),
        };
        let Some(ids) = cell.ids() else {
            return Ok(IntegrityVerdict::Unexpected {
                detail: format!(
                    "id list at row {} has {} elements of {} bits",
                    key, cell.elem_count, cell.elem_bits
                ),
            });
        };

        for id in ids.filter(|id| *id != 0) {
            stats.ids_covered += 1;
            let points_back = match many.cell(many_column, id) {
                Ok(back) => single_key(&back) == Some(key),
                Err(e) if e.is_row_not_found() => false,
                Err(e) => return Err(e),
            };
            if !points_back {
                return Ok(IntegrityVerdict::Inconsistent {
                    key,
                    origins: vec![id],
                });
            }
        }
    }

    Ok(IntegrityVerdict::Ok)
}
