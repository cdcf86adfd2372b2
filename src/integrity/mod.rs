//! Referential-integrity verification between row-sets
//!
//! A "many" row-set holds one foreign key per row; a "one" row-set holds,
//! per row, the list of "many" rows pointing at it. Both directions are
//! verified under a fixed memory ceiling:
//!
//! - `pairs`: `(key, origin)` pairs, sorting, span detection
//! - `chunk`: chunk sizing and working-set allocation
//! - `checker`: the pairwise check itself
//! - `orchestrator`: which relationships to check, and in which order

mod checker;
mod chunk;
mod cursor;
mod orchestrator;
mod pairs;
mod relationship;

pub use checker::{CheckOutcome, PairwiseIntegrityChecker, RelationshipStats, SMALL_CELL};
pub use chunk::{work_chunk, ChunkBuffers, BYTES_PER_ROW, DEFAULT_MEMORY_CEILING};
pub use cursor::{CellView, ColumnId, CursorError, CursorResult, IdIter, RowCursor, RowRange};
pub use orchestrator::{IntegrityOrchestrator, RelationshipOutcome, RowSetSource};
pub use pairs::{id_pair_span, ChunkSorter, IdPair};
pub use relationship::{Relationship, ALIGNMENT_RELATIONSHIPS};
