//! Chunk sizing under a fixed working-set ceiling

use std::mem::size_of;

use super::pairs::IdPair;

/// Default working-set ceiling: 2 GiB
pub const DEFAULT_MEMORY_CEILING: u64 = 2 * 1024 * 1024 * 1024;

/// Bytes held per chunk row: one pair plus one scratch id
pub const BYTES_PER_ROW: u64 = (size_of::<IdPair>() + size_of::<i64>()) as u64;

/// Rows per chunk for `count` rows under `ceiling` bytes
///
/// Starts from `count` and halves until `chunk * BYTES_PER_ROW` fits. The
/// result is 0 only when `count` is 0 or not even one row fits.
pub fn work_chunk(count: u64, ceiling: u64) -> u64 {
    let max = ceiling / BYTES_PER_ROW;
    let mut chunk = count;
    while chunk > max {
        chunk /= 2;
    }
    chunk
}

/// Per-check working set, allocated once at the chunk size
#[derive(Debug)]
pub struct ChunkBuffers {
    /// Pairs read from the current chunk
    pub pairs: Vec<IdPair>,
    /// Copy of the "one"-side cell being compared
    pub scratch: Vec<i64>,
}

impl ChunkBuffers {
    /// Reserves room for `rows` pairs and ids, or `None` if that fails
    pub fn allocate(rows: usize) -> Option<Self> {
        let mut pairs = Vec::new();
        let mut scratch = Vec::new();
        pairs.try_reserve_exact(rows).ok()?;
        scratch.try_reserve_exact(rows).ok()?;
        Some(Self { pairs, scratch })
    }
}
