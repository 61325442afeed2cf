//! Errors surfaced by tree mutation and cloning.

use thiserror::Error;

use crate::NodeId;

/// Contract violations when mutating or copying a [`DomTree`](crate::DomTree).
///
/// When an operation returns one of these, the tree is exactly as it was
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle does not name a node in this tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),

    /// Only Document, Element and CDATA nodes may have children.
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),

    /// The insertion would make a node its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// The intended parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },

    /// A Document node can never be attached below another node.
    #[error("document node {0:?} cannot become a child")]
    DocumentAsChild(NodeId),

    /// Sibling operations need the reference node to have a parent.
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),

    /// The reference node is not a child of the given parent.
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The parent that was searched.
        parent: NodeId,
        /// The node that was expected among its children.
        child: NodeId,
    },
}
