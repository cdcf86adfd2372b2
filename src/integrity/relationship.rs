//! Relationships checked for the alignment family

use serde::Serialize;

use crate::structure::{RowSet, RowSetMask};

/// A "many" foreign-key column paired with a "one" multi-valued id column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Row-set holding the id lists
    pub one: RowSet,
    /// Multi-valued id column on the "one" side
    pub one_column: &'static str,
    /// Row-set holding the foreign keys
    pub many: RowSet,
    /// Foreign-key column on the "many" side
    pub many_column: &'static str,
}

impl Relationship {
    /// `ONE.COLUMN <-> MANY.COLUMN`
    pub fn label(&self) -> String {
        format!(
            "{}.{} <-> {}.{}",
            self.one, self.one_column, self.many, self.many_column
        )
    }

    /// True when both row-sets are present
    pub fn applies_to(&self, present: RowSetMask) -> bool {
        present.contains(self.one) && present.contains(self.many)
    }
}

/// Relationships in check order
pub const ALIGNMENT_RELATIONSHIPS: [Relationship; 4] = [
    Relationship {
        one: RowSet::Sequence,
        one_column: "PRIMARY_ALIGNMENT_ID",
        many: RowSet::PrimaryAlignment,
        many_column: "SEQ_SPOT_ID",
    },
    Relationship {
        one: RowSet::Reference,
        one_column: "PRIMARY_ALIGNMENT_IDS",
        many: RowSet::PrimaryAlignment,
        many_column: "REF_ID",
    },
    Relationship {
        one: RowSet::Reference,
        one_column: "SECONDARY_ALIGNMENT_IDS",
        many: RowSet::SecondaryAlignment,
        many_column: "REF_ID",
    },
    Relationship {
        one: RowSet::Reference,
        one_column: "EVIDENCE_ALIGNMENT_IDS",
        many: RowSet::EvidenceAlignment,
        many_column: "REF_ID",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(
            ALIGNMENT_RELATIONSHIPS[0].label(),
            "SEQUENCE.PRIMARY_ALIGNMENT_ID <-> PRIMARY_ALIGNMENT.SEQ_SPOT_ID"
        );
    }

    #[test]
    fn test_applies_only_when_both_sides_present() {
        let present: RowSetMask = [RowSet::Reference, RowSet::PrimaryAlignment]
            .into_iter()
            .collect();
        let applicable: Vec<_> = ALIGNMENT_RELATIONSHIPS
            .iter()
            .filter(|r| r.applies_to(present))
            .map(|r| r.one_column)
            .collect();
        assert_eq!(applicable, vec!["PRIMARY_ALIGNMENT_IDS"]);
    }
}
