//! Object tree reconstruction
//!
//! Rebuilds the container's object hierarchy from the visitation stream
//! instead of trusting the container's own directory of objects.
//!
//! Storage is a flat node array plus a NUL-separated name arena, both sized
//! once from the pre-pass census and discarded after the run.

mod arena;
mod builder;
mod errors;
mod node;
mod visit_tree;

pub use arena::{NameArena, NameOffset};
pub use builder::VisitTreeBuilder;
pub use errors::{TreeError, TreeErrorCode, TreeResult};
pub use node::{NodeRef, TreeNode};
pub use visit_tree::{Children, Outline, Preorder, VisitTree};
