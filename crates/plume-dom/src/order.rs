//! [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
//! and node-set helpers built on document order.

use std::cmp::Ordering;
use std::collections::HashSet;

use strum_macros::Display;

use crate::{DomTree, NodeId};

/// Where one node sits relative to another, from the first node's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DocumentPosition {
    /// Both handles name the same node.
    Equal,
    /// The nodes do not share a root.
    Disconnected,
    /// The first node comes earlier in document order.
    Precedes,
    /// The first node comes later in document order.
    Follows,
    /// The first node is an ancestor of the second.
    Contains,
    /// The first node is a descendant of the second.
    ContainedBy,
}

impl DomTree {
    /// Inclusive ancestor chain, root first.
    fn chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = self.ancestors(id).collect();
        chain.reverse();
        chain.push(id);
        chain
    }

    /// Compare `a` against `b` by walking both ancestor chains down from the
    /// shared root to the point where they diverge.
    #[must_use]
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> DocumentPosition {
        if a == b {
            return DocumentPosition::Equal;
        }
        if !self.contains(a) || !self.contains(b) {
            return DocumentPosition::Disconnected;
        }
        let chain_a = self.chain(a);
        let chain_b = self.chain(b);
        if chain_a[0] != chain_b[0] {
            return DocumentPosition::Disconnected;
        }

        let shared = chain_a
            .iter()
            .zip(&chain_b)
            .take_while(|(x, y)| x == y)
            .count();
        if shared == chain_a.len() {
            return DocumentPosition::Contains;
        }
        if shared == chain_b.len() {
            return DocumentPosition::ContainedBy;
        }

        let parent = chain_a[shared - 1];
        let (branch_a, branch_b) = (chain_a[shared], chain_b[shared]);
        for &child in self.children(parent) {
            if child == branch_a {
                return DocumentPosition::Precedes;
            }
            if child == branch_b {
                return DocumentPosition::Follows;
            }
        }
        DocumentPosition::Disconnected
    }

    /// Document order as an [`Ordering`]; `None` for disconnected nodes.
    ///
    /// An ancestor sorts before its descendants.
    #[must_use]
    pub fn document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        match self.compare_document_position(a, b) {
            DocumentPosition::Equal => Some(Ordering::Equal),
            DocumentPosition::Precedes | DocumentPosition::Contains => Some(Ordering::Less),
            DocumentPosition::Follows | DocumentPosition::ContainedBy => Some(Ordering::Greater),
            DocumentPosition::Disconnected => None,
        }
    }

    /// Drop every node that is a duplicate of, or a descendant of, another
    /// node in the list. Survivors keep their input order.
    #[must_use]
    pub fn remove_subsets(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let members: HashSet<NodeId> = nodes.iter().copied().collect();
        let mut emitted = HashSet::new();
        nodes
            .iter()
            .copied()
            .filter(|&id| !self.ancestors(id).any(|a| members.contains(&a)))
            .filter(|&id| emitted.insert(id))
            .collect()
    }

    /// Deduplicate and sort into document order.
    ///
    /// Nodes under different roots are grouped by their root's handle so the
    /// result is still deterministic.
    #[must_use]
    pub fn unique_sort(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut unique: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&id| self.contains(id) && seen.insert(id))
            .collect();
        unique.sort_by_cached_key(|&id| self.order_key(id));
        unique
    }

    /// Root handle plus child-index path; lexicographic order on this key is
    /// pre-order document order.
    fn order_key(&self, id: NodeId) -> (NodeId, Vec<usize>) {
        let chain = self.chain(id);
        let path = chain
            .windows(2)
            .map(|pair| {
                self.children(pair[0])
                    .iter()
                    .position(|&c| c == pair[1])
                    .unwrap_or_default()
            })
            .collect();
        (chain[0], path)
    }
}
