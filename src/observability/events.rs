//! Observable events of a validation run
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
///
/// These cover:
/// - Run lifecycle
/// - Configuration and discovery
/// - Visitation and tree reconstruction
/// - Structural classification
/// - Referential integrity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run lifecycle
    /// Validation of one object begins
    ValidateBegin,
    /// Validation of one object passed
    ValidateComplete,
    /// Validation of one object found failures
    ValidateFailed,
    /// A stop was requested and the run ended early
    RunInterrupted,
    /// A container broke the visitation contract
    ContractViolation,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Command-line paths expanded into containers
    DiscoveryComplete,
    /// Container opened
    ContainerOpened,

    // Structure
    /// Visit tree rebuilt
    TreeBuilt,
    /// Schema family and row-sets classified
    StructureClassified,

    // Integrity
    /// Relationship checks begin
    IntegrityBegin,
    /// Relationship checks complete
    IntegrityComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            // Run lifecycle
            Event::ValidateBegin => "VALIDATE_BEGIN",
            Event::ValidateComplete => "VALIDATE_COMPLETE",
            Event::ValidateFailed => "VALIDATE_FAILED",
            Event::RunInterrupted => "RUN_INTERRUPTED",
            Event::ContractViolation => "CONTRACT_VIOLATION",

            // Configuration
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DiscoveryComplete => "DISCOVERY_COMPLETE",
            Event::ContainerOpened => "CONTAINER_OPENED",

            // Structure
            Event::TreeBuilt => "TREE_BUILT",
            Event::StructureClassified => "STRUCTURE_CLASSIFIED",

            // Integrity
            Event::IntegrityBegin => "INTEGRITY_BEGIN",
            Event::IntegrityComplete => "INTEGRITY_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ContractViolation => Severity::Fatal,
            Event::ValidateFailed => Severity::Error,
            Event::RunInterrupted => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
