//! Single-pass tree reconstruction from a depth-tagged visitation stream
//!
//! Only the previously appended node is tracked. Ancestry for an event that
//! climbs back up is re-derived by walking parent links already written, so
//! no explicit stack is needed.
//!
//! # Invariants
//!
//! - The first event is the root and has depth 0
//! - A child is exactly one level deeper than its parent
//! - Sibling chains are doubly linked; the root has no parent or siblings
//! - Storage never grows beyond the pre-pass census

use super::arena::NameArena;
use super::errors::{TreeError, TreeResult};
use super::node::{NodeRef, TreeNode};
use super::visit_tree::VisitTree;
use crate::visit::{Census, VisitEvent};

/// Builds a [`VisitTree`] from visit events, one event at a time
#[derive(Debug)]
pub struct VisitTreeBuilder {
    nodes: Vec<TreeNode>,
    names: NameArena,
    max_nodes: usize,
}

impl VisitTreeBuilder {
    /// Allocates node and name storage exactly as counted by the pre-pass
    pub fn with_capacity(census: Census) -> Self {
        Self {
            nodes: Vec::with_capacity(census.objects),
            names: NameArena::with_capacity(census.name_bytes),
            max_nodes: census.objects,
        }
    }

    /// Number of nodes appended so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True before the first event
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends the next event and links it into the tree.
    ///
    /// Fails with `DBCHECK_TREE_CAPACITY_EXCEEDED` when the census was too
    /// small and with `DBCHECK_TREE_MALFORMED_STREAM` when the event cannot
    /// be placed without corrupting the tree.
    pub fn push(&mut self, event: &VisitEvent) -> TreeResult<NodeRef> {
        let index = self.nodes.len();
        if index >= self.max_nodes {
            return Err(TreeError::capacity_exceeded(
                index,
                format!(
                    "object '{}' exceeds the pre-counted capacity of {} objects",
                    event.name, self.max_nodes
                ),
            ));
        }

        let this = NodeRef(index);
        let links = self.place(index, event)?;
        let name = self.names.push(&event.name, index)?;

        let mut node = TreeNode::detached(event.depth, name, event.kind);
        match links {
            Placement::Root => {}
            Placement::FirstChildOf(parent) => {
                node.parent = Some(parent);
                self.nodes[parent.0].first_child = Some(this);
            }
            Placement::NextSiblingOf(sibling) => {
                node.parent = self.nodes[sibling.0].parent;
                node.prev_sibling = Some(sibling);
                self.nodes[sibling.0].next_sibling = Some(this);
            }
        }

        self.nodes.push(node);
        Ok(this)
    }

    /// Decides where the event goes without mutating anything
    fn place(&self, index: usize, event: &VisitEvent) -> TreeResult<Placement> {
        let Some(prev) = self.nodes.last() else {
            if event.depth != 0 {
                return Err(TreeError::malformed(
                    index,
                    format!("root object '{}' has depth {}", event.name, event.depth),
                ));
            }
            return Ok(Placement::Root);
        };
        let prev_ref = NodeRef(index - 1);

        if event.depth == prev.depth {
            if prev.parent.is_none() {
                return Err(TreeError::malformed(
                    index,
                    format!("second root object '{}'", event.name),
                ));
            }
            return Ok(Placement::NextSiblingOf(prev_ref));
        }

        if event.depth > prev.depth {
            if event.depth != prev.depth + 1 {
                return Err(TreeError::malformed(
                    index,
                    format!(
                        "object '{}' jumps from depth {} to {}",
                        event.name, prev.depth, event.depth
                    ),
                ));
            }
            return Ok(Placement::FirstChildOf(prev_ref));
        }

        // Climbing back up: find the ancestor of `prev` at the event's depth.
        let mut sibling = prev.parent.ok_or_else(|| {
            TreeError::malformed(index, "previous object has no parent to climb through")
        })?;
        while self.nodes[sibling.0].depth > event.depth {
            sibling = self.nodes[sibling.0].parent.ok_or_else(|| {
                TreeError::malformed(
                    index,
                    format!("no ancestor at depth {} for '{}'", event.depth, event.name),
                )
            })?;
        }

        let anchor = &self.nodes[sibling.0];
        if anchor.depth != event.depth {
            return Err(TreeError::malformed(
                index,
                format!(
                    "ancestor chain skips depth {} for '{}'",
                    event.depth, event.name
                ),
            ));
        }
        if anchor.parent.is_none() {
            return Err(TreeError::malformed(
                index,
                format!("second root object '{}'", event.name),
            ));
        }

        Ok(Placement::NextSiblingOf(sibling))
    }

    /// Seals the tree; at least the root must have been pushed
    pub fn finish(self) -> TreeResult<VisitTree> {
        if self.nodes.is_empty() {
            return Err(TreeError::empty_stream());
        }
        Ok(VisitTree::from_parts(self.nodes, self.names))
    }
}

enum Placement {
    Root,
    FirstChildOf(NodeRef),
    NextSiblingOf(NodeRef),
}
