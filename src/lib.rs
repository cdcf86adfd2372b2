//! dbcheck - read-only consistency validator for hierarchical
//! column-oriented database containers
//!
//! A run walks one database or table, rebuilds its object tree, classifies
//! the tree by schema family and, for alignment databases, checks that the
//! identifier columns linking its row-sets agree in both directions.

pub mod cli;
pub mod container;
pub mod integrity;
pub mod observability;
pub mod report;
pub mod structure;
pub mod tree;
pub mod validate;
pub mod visit;
