//! Cloning and structural equality.

use crate::{DomTree, NodeId, NodeType, TreeError};

/// One node copied out of a source tree, with the slot of its parent in the
/// same snapshot.
struct Snapshot {
    parent: Option<usize>,
    node_type: NodeType,
    start_index: Option<usize>,
    end_index: Option<usize>,
}

impl DomTree {
    /// [§ 4.4 cloneNode](https://dom.spec.whatwg.org/#dom-node-clonenode)
    ///
    /// Copy `id` (and its whole subtree when `deep`). The copy is detached.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] when `id` is not in this tree.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId, TreeError> {
        let snapshot = self.snapshot(id, deep)?;
        Ok(self.materialize(snapshot))
    }

    /// [§ 4.5 importNode](https://dom.spec.whatwg.org/#dom-document-importnode)
    ///
    /// Copy `id` from `other` into this tree as a detached node.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] when `id` is not in `other`.
    pub fn import_node(
        &mut self,
        other: &Self,
        id: NodeId,
        deep: bool,
    ) -> Result<NodeId, TreeError> {
        let snapshot = other.snapshot(id, deep)?;
        Ok(self.materialize(snapshot))
    }

    fn snapshot(&self, id: NodeId, deep: bool) -> Result<Vec<Snapshot>, TreeError> {
        let mut out = Vec::new();
        let mut stack = vec![(id, None)];
        while let Some((current, parent)) = stack.pop() {
            let node = self.get(current).ok_or(TreeError::UnknownNode(current))?;
            let slot = out.len();
            out.push(Snapshot {
                parent,
                node_type: node.node_type.clone(),
                start_index: node.start_index,
                end_index: node.end_index,
            });
            if deep {
                stack.extend(node.children.iter().rev().map(|&c| (c, Some(slot))));
            }
        }
        Ok(out)
    }

    fn materialize(&mut self, snapshot: Vec<Snapshot>) -> NodeId {
        let mut ids: Vec<NodeId> = Vec::with_capacity(snapshot.len());
        for entry in snapshot {
            let id = self.alloc(entry.node_type);
            if let Some(node) = self.get_mut(id) {
                node.start_index = entry.start_index;
                node.end_index = entry.end_index;
            }
            if let Some(parent) = entry.parent.and_then(|slot| ids.get(slot).copied()) {
                self.link_last(parent, id);
            }
            ids.push(id);
        }
        // The snapshot always holds at least the requested node.
        ids.first().copied().unwrap_or(NodeId::ROOT)
    }

    /// Structural equality of the subtree at `a` in this tree and the
    /// subtree at `b` in `other`.
    ///
    /// Elements match on tag name and attribute set (order-independent);
    /// character data matches on content. Whether an element was written
    /// self-closing does not matter, nor do source offsets.
    #[must_use]
    pub fn subtree_eq(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((x, y)) = stack.pop() {
            let (Some(left), Some(right)) = (self.get(x), other.get(y)) else {
                return false;
            };
            let same = match (&left.node_type, &right.node_type) {
                (NodeType::Element(l), NodeType::Element(r)) => {
                    l.tag_name == r.tag_name && l.attrs == r.attrs
                }
                (l, r) => l == r,
            };
            if !same || left.children.len() != right.children.len() {
                return false;
            }
            stack.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }
}
