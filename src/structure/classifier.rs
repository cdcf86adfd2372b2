//! Structural classification of a reconstructed object tree
//!
//! Looks only at the root's direct children. Row-set membership is decided by
//! exact name match against `RowSet`; anything else is an unexpected object,
//! which is a warning unless it leaves a required row-set missing.

use std::fmt;

use serde::Serialize;

use super::row_set::{RowSet, RowSetMask};
use crate::report::StructuralVerdict;
use crate::tree::VisitTree;
use crate::visit::ObjectKind;

/// Columns a sequence table cannot be used without
pub const SEQUENCE_REQUIRED_COLUMNS: [&str; 2] = ["READ", "QUALITY"];

/// Column whose absence leaves a sequence table usable for fasta only
pub const SEQUENCE_OPTIONAL_COLUMN: &str = "SPOT_LEN";

/// Schema family derived from a declared schema name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaFamily {
    /// `NCBI:align:db:*`
    Alignment,
    /// `NCBI:var:db:*`
    Variation,
    /// `NCBI:WGS:db:*`
    Wgs,
    /// `NCBI:SRA:PacBio:smrt:db`
    PacBio,
    /// Stand-alone sequence table, legacy (unnamed) or `NCBI:SRA:*`
    Sequence,
    /// Anything else; carries the declared name
    Other(String),
}

impl SchemaFamily {
    /// Family of a database root
    pub fn of_database(schema: &str) -> Self {
        let name = strip_version(schema);
        if name.starts_with("NCBI:align:db:") {
            SchemaFamily::Alignment
        } else if name.starts_with("NCBI:var:db:") {
            SchemaFamily::Variation
        } else if name.starts_with("NCBI:WGS:db:") {
            SchemaFamily::Wgs
        } else if name == "NCBI:SRA:PacBio:smrt:db" {
            SchemaFamily::PacBio
        } else {
            SchemaFamily::Other(name.to_string())
        }
    }

    /// Family of a table root
    pub fn of_table(schema: &str) -> Self {
        let name = strip_version(schema);
        if name.is_empty() || name.starts_with("NCBI:SRA:") {
            SchemaFamily::Sequence
        } else {
            SchemaFamily::Other(name.to_string())
        }
    }

    /// False only for `Other`
    pub fn is_recognized(&self) -> bool {
        !matches!(self, SchemaFamily::Other(_))
    }
}

impl fmt::Display for SchemaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaFamily::Alignment => write!(f, "alignment"),
            SchemaFamily::Variation => write!(f, "variation"),
            SchemaFamily::Wgs => write!(f, "wgs"),
            SchemaFamily::PacBio => write!(f, "pacbio"),
            SchemaFamily::Sequence => write!(f, "sequence"),
            SchemaFamily::Other(name) => write!(f, "unrecognized type '{}'", name),
        }
    }
}

fn strip_version(schema: &str) -> &str {
    match schema.find('#') {
        Some(at) => &schema[..at],
        None => schema,
    }
}

/// A top-level child outside the known vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnexpectedObject {
    /// Object name
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
}

impl UnexpectedObject {
    /// Warning verdict for this object
    pub fn verdict(&self) -> StructuralVerdict {
        StructuralVerdict::Unexpected {
            object: self.name.clone(),
        }
    }
}

/// Result of classifying one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Recognized row-sets found at the top level
    pub present: RowSetMask,
    /// Required-set and paired-presence outcome
    pub verdict: StructuralVerdict,
    /// Children outside the vocabulary, in tree order
    pub unexpected: Vec<UnexpectedObject>,
    /// Only a sequence row-set was found
    pub unaligned_only: bool,
    /// Optional objects that are absent (warnings)
    pub missing_optional: Vec<String>,
}

/// Derives structural verdicts from a tree's top level
pub struct StructuralClassifier;

impl StructuralClassifier {
    /// Classifies an alignment-family database
    ///
    /// Rules, checked in this order:
    /// 1. a database holding only `SEQUENCE` is valid unaligned data
    /// 2. `REFERENCE` and `PRIMARY_ALIGNMENT` are required together
    /// 3. `EVIDENCE_ALIGNMENT` and `EVIDENCE_INTERVAL` are both present or
    ///    both absent
    pub fn classify_alignment(tree: &VisitTree) -> Classification {
        let mut present = RowSetMask::empty();
        let mut unexpected = Vec::new();

        for child in tree.children(tree.root()) {
            let name = tree.name(child);
            let kind = tree.kind(child);
            match (kind, RowSet::from_name(name)) {
                (ObjectKind::Table, Some(set)) => present.insert(set),
                _ => unexpected.push(UnexpectedObject {
                    name: name.to_string(),
                    kind,
                }),
            }
        }

        let unaligned_only = present.is_only(RowSet::Sequence);
        let mut missing = Vec::new();
        if !unaligned_only {
            for required in [RowSet::Reference, RowSet::PrimaryAlignment] {
                if !present.contains(required) {
                    missing.push(required.name().to_string());
                }
            }
            let alignment = present.contains(RowSet::EvidenceAlignment);
            let interval = present.contains(RowSet::EvidenceInterval);
            if alignment && !interval {
                missing.push(RowSet::EvidenceInterval.name().to_string());
            } else if interval && !alignment {
                missing.push(RowSet::EvidenceAlignment.name().to_string());
            }
        }

        let verdict = if missing.is_empty() {
            StructuralVerdict::Ok
        } else {
            StructuralVerdict::Incomplete { missing }
        };

        Classification {
            present,
            verdict,
            unexpected,
            unaligned_only,
            missing_optional: Vec::new(),
        }
    }

    /// Classifies a stand-alone sequence table by its columns
    pub fn classify_sequence_table(tree: &VisitTree) -> Classification {
        let root = tree.root();
        let has_column = |name: &str| {
            tree.find_child(root, name)
                .map(|node| tree.kind(node) == ObjectKind::Column)
                .unwrap_or(false)
        };

        let missing: Vec<String> = SEQUENCE_REQUIRED_COLUMNS
            .iter()
            .filter(|name| !has_column(name))
            .map(|name| name.to_string())
            .collect();

        // Optional columns only matter once the table is usable at all.
        let missing_optional = if missing.is_empty() && !has_column(SEQUENCE_OPTIONAL_COLUMN) {
            vec![SEQUENCE_OPTIONAL_COLUMN.to_string()]
        } else {
            Vec::new()
        };

        let verdict = if missing.is_empty() {
            StructuralVerdict::Ok
        } else {
            StructuralVerdict::Incomplete { missing }
        };

        Classification {
            present: RowSetMask::empty(),
            verdict,
            unexpected: Vec::new(),
            unaligned_only: false,
            missing_optional,
        }
    }
}
