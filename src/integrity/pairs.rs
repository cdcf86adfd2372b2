//! Key/origin pairs and span detection

use serde::Serialize;

/// A foreign key read from the "many" side, with the row it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IdPair {
    /// Foreign key value (row id on the "one" side)
    pub key: i64,
    /// Row id on the "many" side
    pub origin: i64,
}

impl IdPair {
    /// Creates a pair
    pub fn new(key: i64, origin: i64) -> Self {
        Self { key, origin }
    }
}

/// Sorts chunk working sets
pub struct ChunkSorter;

impl ChunkSorter {
    /// Sorts by key, then by origin
    pub fn sort(pairs: &mut [IdPair]) {
        pairs.sort_unstable_by(|a, b| a.key.cmp(&b.key).then(a.origin.cmp(&b.origin)));
    }

    /// Sorts plain row ids ascending
    pub fn sort_ids(ids: &mut [i64]) {
        ids.sort_unstable();
    }
}

/// Number of consecutive entries starting at `first` sharing its key
///
/// Returns 0 only when `first` is out of bounds.
pub fn id_pair_span(pairs: &[IdPair], first: usize) -> usize {
    let Some(head) = pairs.get(first) else {
        return 0;
    };
    pairs[first..]
        .iter()
        .take_while(|pair| pair.key == head.key)
        .count()
}
