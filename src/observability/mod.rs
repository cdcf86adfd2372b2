//! Observability for validation runs
//!
//! - Structured logging (JSON), one line per event
//! - Typed lifecycle events, each with a fixed severity
//! - Begin/complete scopes around each relationship check
//!
//! Logging is read-only: nothing logged feeds back into a verdict.
//!
//! ```ignore
//! use dbcheck::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::TreeBuilt, &[("objects", "42")]);
//!
//! let scope = ObservationScope::begin("INTEGRITY_CHECK", &[("relationship", label)]);
//! scope.complete(&[("status", "ok")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::emit(event.severity(), event.as_str(), fields);
}
