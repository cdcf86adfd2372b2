//! Visitation source contract
//!
//! A source is walked twice per validation run:
//! 1. `census`: enumerate-only pre-pass sizing the tree arena
//! 2. `visit`: the checking walk, pushing reports into a `VisitSink`

use std::ops::ControlFlow;

use serde::Serialize;

use super::event::VisitReport;
use crate::container::ContainerResult;
use crate::validate::ValidateResult;

/// Object count and total name bytes found by the enumerate-only pre-pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    /// Number of objects, root included
    pub objects: usize,
    /// Sum of `name.len() + 1` over all objects
    pub name_bytes: usize,
}

impl Census {
    /// Accounts for one enumerated object
    pub fn record(&mut self, name: &str) {
        self.objects += 1;
        self.name_bytes += name.len() + 1;
    }
}

/// How deep the container's own physical checks go
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLevel {
    /// Structure and component digests only
    Metadata,
    /// Also verify blob CRC32s
    BlobCrc,
    /// Also verify index digests
    Index,
}

impl CheckLevel {
    /// Derives the level from the two strictness switches
    pub fn from_flags(blob_crc: bool, index_check: bool) -> Self {
        if index_check {
            CheckLevel::Index
        } else if blob_crc {
            CheckLevel::BlobCrc
        } else {
            CheckLevel::Metadata
        }
    }
}

/// Options handed to a visitation source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOptions {
    /// Physical check depth
    pub level: CheckLevel,
    /// Restrict physical checks to indices
    pub index_only: bool,
}

/// Receiver of visitation reports
///
/// Returning `ControlFlow::Break` asks the source to stop walking; an error
/// aborts the walk and must be propagated unchanged by the source.
pub trait VisitSink {
    /// Accepts the next report
    fn report(&mut self, report: VisitReport) -> ValidateResult<ControlFlow<()>>;
}

/// A walkable container object
pub trait VisitSource {
    /// Enumerates every object once without checking anything
    fn census(&self) -> ContainerResult<Census>;

    /// Walks the object in pre-order, delivering reports to `sink`
    ///
    /// Sibling `Visit` reports at the same depth are contiguous and a child is
    /// exactly one level deeper than its parent.
    fn visit(&self, options: VisitOptions, sink: &mut dyn VisitSink) -> ValidateResult<()>;
}
