//! Read-only navigation over a reconstructed tree

use serde::Serialize;

use super::arena::NameArena;
use super::node::{NodeRef, TreeNode};
use crate::visit::{ObjectKind, VisitEvent};

/// A reconstructed object tree; owns its node array and name arena
#[derive(Debug)]
pub struct VisitTree {
    nodes: Vec<TreeNode>,
    names: NameArena,
}

impl VisitTree {
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, names: NameArena) -> Self {
        Self { nodes, names }
    }

    /// The walked object itself
    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a finished tree
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node behind `node`
    pub fn node(&self, node: NodeRef) -> &TreeNode {
        &self.nodes[node.0]
    }

    /// Returns the node's name
    pub fn name(&self, node: NodeRef) -> &str {
        self.names.get(self.nodes[node.0].name)
    }

    /// Returns the node's kind
    pub fn kind(&self, node: NodeRef) -> ObjectKind {
        self.nodes[node.0].kind
    }

    /// Iterates the direct children of `node` in stream order
    pub fn children(&self, node: NodeRef) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes[node.0].first_child,
        }
    }

    /// Number of direct children of `node`
    pub fn child_count(&self, node: NodeRef) -> usize {
        self.children(node).count()
    }

    /// Finds a direct child by exact name
    pub fn find_child(&self, node: NodeRef, name: &str) -> Option<NodeRef> {
        self.children(node).find(|child| self.name(*child) == name)
    }

    /// Pre-order traversal driven purely by the links
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            next: Some(self.root()),
        }
    }

    /// Replays the tree as the visit events it was built from
    pub fn to_events(&self) -> Vec<VisitEvent> {
        self.preorder()
            .map(|node| VisitEvent::new(self.name(node), self.kind(node), self.node(node).depth))
            .collect()
    }

    /// Nested, serializable view of the subtree under `node`
    pub fn outline(&self, node: NodeRef) -> Outline {
        Outline {
            name: self.name(node).to_string(),
            kind: self.kind(node),
            children: self
                .children(node)
                .map(|child| self.outline(child))
                .collect(),
        }
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a VisitTree,
    next: Option<NodeRef>,
}

impl Iterator for Children<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.next?;
        self.next = self.tree.nodes[current.0].next_sibling;
        Some(current)
    }
}

/// Link-driven pre-order iterator
pub struct Preorder<'a> {
    tree: &'a VisitTree,
    next: Option<NodeRef>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.next?;
        let nodes = &self.tree.nodes;

        self.next = match nodes[current.0].first_child {
            Some(child) => Some(child),
            None => {
                let mut climb = Some(current);
                let mut successor = None;
                while let Some(node) = climb {
                    if let Some(sibling) = nodes[node.0].next_sibling {
                        successor = Some(sibling);
                        break;
                    }
                    climb = nodes[node.0].parent;
                }
                successor
            }
        };

        Some(current)
    }
}

/// Nested tree view used for JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outline {
    /// Object name
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
    /// Direct children in stream order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}
