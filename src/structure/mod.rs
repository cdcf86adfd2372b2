//! Structural invariants over a reconstructed tree

mod classifier;
mod row_set;

pub use classifier::{
    Classification, SchemaFamily, StructuralClassifier, UnexpectedObject,
    SEQUENCE_OPTIONAL_COLUMN, SEQUENCE_REQUIRED_COLUMNS,
};
pub use row_set::{RowSet, RowSetMask};
