//! Verdicts, reporting sinks and the per-object report
//!
//! The core produces verdicts; how they are displayed belongs to the sink.

mod sink;
mod summary;
mod verdict;

pub use sink::{LogSink, MemorySink, NullSink, ReportSink};
pub use summary::{Finding, ValidationReport};
pub use verdict::{CheckVerdict, IntegrityVerdict, Status, StructuralVerdict, Verdict};
