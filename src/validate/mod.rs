//! Validation runs
//!
//! Ties the visitation source, tree reconstruction, structural classifier
//! and integrity orchestrator together for one top-level object.

mod config;
mod errors;
mod stop;
mod validator;

pub use config::ValidateConfig;
pub use errors::{Severity, ValidateError, ValidateErrorCode, ValidateResult};
pub use stop::StopFlag;
pub use validator::{Validator, NOTHING_TO_VALIDATE};
