//! Visitation stream model
//!
//! The container collaborator walks an opened database or table and
//! describes it as a flat, depth-tagged, pre-order stream of reports.
//! The stream is the only structural input the validator trusts.

mod event;
mod source;

pub use event::{
    FailureCode, ObjectKind, VisitEvent, VisitReport, MISSING_CHECKSUMS, UNEXPECTED_OBJECT_PREFIX,
};
pub use source::{Census, CheckLevel, VisitOptions, VisitSink, VisitSource};
