//! Flat-array tree nodes
//!
//! Links are indices into the owning node array, never pointers.

use super::arena::NameOffset;
use crate::visit::ObjectKind;

/// Index of a node inside its tree's node array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    /// Position in the node array (equals the event's position in the stream)
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One reconstructed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    /// Enclosing object; `None` only for the root
    pub parent: Option<NodeRef>,
    /// Previous object at the same depth under the same parent
    pub prev_sibling: Option<NodeRef>,
    /// Next object at the same depth under the same parent
    pub next_sibling: Option<NodeRef>,
    /// First contained object
    pub first_child: Option<NodeRef>,
    /// Depth below the root
    pub depth: u32,
    /// Name location in the tree's arena
    pub name: NameOffset,
    /// Object kind
    pub kind: ObjectKind,
}

impl TreeNode {
    pub(crate) fn detached(depth: u32, name: NameOffset, kind: ObjectKind) -> Self {
        Self {
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            depth,
            name,
            kind,
        }
    }
}
