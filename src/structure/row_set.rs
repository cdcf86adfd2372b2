//! Recognized row-set vocabulary of the alignment family

use std::fmt;

use serde::Serialize;

/// A table the alignment family knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowSet {
    /// Reads
    Sequence,
    /// Primary alignments of reads to references
    PrimaryAlignment,
    /// Secondary alignments
    SecondaryAlignment,
    /// Reference sequences
    Reference,
    /// Evidence alignments
    EvidenceAlignment,
    /// Evidence intervals
    EvidenceInterval,
}

impl RowSet {
    /// Every recognized row-set
    pub const ALL: [RowSet; 6] = [
        RowSet::Sequence,
        RowSet::PrimaryAlignment,
        RowSet::SecondaryAlignment,
        RowSet::Reference,
        RowSet::EvidenceAlignment,
        RowSet::EvidenceInterval,
    ];

    /// Table name inside the container
    pub fn name(&self) -> &'static str {
        match self {
            RowSet::Sequence => "SEQUENCE",
            RowSet::PrimaryAlignment => "PRIMARY_ALIGNMENT",
            RowSet::SecondaryAlignment => "SECONDARY_ALIGNMENT",
            RowSet::Reference => "REFERENCE",
            RowSet::EvidenceAlignment => "EVIDENCE_ALIGNMENT",
            RowSet::EvidenceInterval => "EVIDENCE_INTERVAL",
        }
    }

    /// Exact, case-sensitive lookup
    pub fn from_name(name: &str) -> Option<RowSet> {
        RowSet::ALL.into_iter().find(|set| set.name() == name)
    }

    fn bit(&self) -> u8 {
        match self {
            RowSet::Sequence => 1 << 0,
            RowSet::PrimaryAlignment => 1 << 1,
            RowSet::SecondaryAlignment => 1 << 2,
            RowSet::Reference => 1 << 3,
            RowSet::EvidenceAlignment => 1 << 4,
            RowSet::EvidenceInterval => 1 << 5,
        }
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of row-sets found at the top level of a database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RowSetMask(u8);

impl RowSetMask {
    /// The empty set
    pub fn empty() -> Self {
        Self(0)
    }

    /// Adds a row-set
    pub fn insert(&mut self, set: RowSet) {
        self.0 |= set.bit();
    }

    /// Membership test
    pub fn contains(&self, set: RowSet) -> bool {
        self.0 & set.bit() != 0
    }

    /// True when nothing was found
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when `set` is the only member
    pub fn is_only(&self, set: RowSet) -> bool {
        self.0 == set.bit()
    }

    /// Members in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = RowSet> + '_ {
        RowSet::ALL.into_iter().filter(|set| self.contains(*set))
    }
}

impl FromIterator<RowSet> for RowSetMask {
    fn from_iter<I: IntoIterator<Item = RowSet>>(iter: I) -> Self {
        let mut mask = RowSetMask::empty();
        for set in iter {
            mask.insert(set);
        }
        mask
    }
}
