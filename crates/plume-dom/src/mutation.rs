//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Every public operation validates first, then detaches the moving node from
//! wherever it was, then links it at the new position. Validation happens
//! before any pointer is touched, so an `Err` leaves the tree untouched.

use crate::{DomTree, NodeId, NodeType, TreeError};

impl DomTree {
    /// Append `child` as the last child of `parent`.
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Errors
    ///
    /// See [`TreeError`]; the tree is unchanged on error.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`TreeError`]; the tree is unchanged on error.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link_at(parent, 0, child);
        Ok(())
    }

    /// Insert `child` into `parent` immediately before `reference`.
    ///
    /// Inserting a node before itself is a no-op.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotAChild`] when `reference` is not a child of `parent`,
    /// plus the usual insertion checks.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        self.check_child_of(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.unlink(child);
        let index = self.index_in(parent, reference);
        self.link_at(parent, index, child);
        Ok(())
    }

    /// Insert `sibling` immediately after `node` in `node`'s parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoParent`] when `node` is detached or the root.
    pub fn append_sibling(&mut self, node: NodeId, sibling: NodeId) -> Result<(), TreeError> {
        let parent = self.parent_of(node)?;
        self.check_insert(parent, sibling)?;
        if node == sibling {
            return Ok(());
        }
        self.unlink(sibling);
        let index = self.index_in(parent, node) + 1;
        self.link_at(parent, index, sibling);
        Ok(())
    }

    /// Insert `sibling` immediately before `node` in `node`'s parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoParent`] when `node` is detached or the root.
    pub fn prepend_sibling(&mut self, node: NodeId, sibling: NodeId) -> Result<(), TreeError> {
        let parent = self.parent_of(node)?;
        self.insert_before(parent, sibling, node)
    }

    /// Detach `node` from its parent. Already detached nodes are left alone.
    ///
    /// The node keeps its own subtree and can be re-attached later.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] for a handle outside the arena.
    pub fn remove_from_tree(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.check_exists(node)?;
        self.unlink(node);
        Ok(())
    }

    /// [§ 4.4 removeChild](https://dom.spec.whatwg.org/#dom-node-removechild)
    ///
    /// # Errors
    ///
    /// [`TreeError::NotAChild`] when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_child_of(parent, child)?;
        self.unlink(child);
        Ok(())
    }

    /// Put `replacement` where `node` is and detach `node`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoParent`] when `node` is detached, plus the usual
    /// insertion checks for `replacement`.
    pub fn replace_with(&mut self, node: NodeId, replacement: NodeId) -> Result<(), TreeError> {
        let parent = self.parent_of(node)?;
        self.check_insert(parent, replacement)?;
        if node == replacement {
            return Ok(());
        }
        self.unlink(replacement);
        let index = self.index_in(parent, node);
        self.unlink(node);
        self.link_at(parent, index, replacement);
        Ok(())
    }

    /// Move every child of `from` to the end of `to`, keeping their order.
    ///
    /// # Errors
    ///
    /// [`TreeError::HierarchyCycle`] when `to` lies inside `from`'s subtree,
    /// [`TreeError::NotAContainer`] when `to` cannot hold children.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), TreeError> {
        self.check_exists(from)?;
        self.check_exists(to)?;
        if from == to {
            return Ok(());
        }
        if !self.nodes[to.0].is_container() {
            return Err(TreeError::NotAContainer(to));
        }
        if let Some(through) = self
            .ancestors(to)
            .find(|&a| self.nodes[a.0].parent == Some(from))
            .or_else(|| (self.nodes[to.0].parent == Some(from)).then_some(to))
        {
            return Err(TreeError::HierarchyCycle {
                parent: to,
                child: through,
            });
        }
        let moving = std::mem::take(&mut self.nodes[from.0].children);
        for child in moving {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            self.link_last(to, child);
        }
        Ok(())
    }

    fn check_exists(&self, id: NodeId) -> Result<(), TreeError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    fn parent_of(&self, node: NodeId) -> Result<NodeId, TreeError> {
        self.check_exists(node)?;
        self.nodes[node.0].parent.ok_or(TreeError::NoParent(node))
    }

    fn check_child_of(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if self.nodes[child.0].parent == Some(parent) {
            Ok(())
        } else {
            Err(TreeError::NotAChild { parent, child })
        }
    }

    /// [§ 4.2.3 ensure pre-insertion validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if matches!(self.nodes[child.0].node_type, NodeType::Document) {
            return Err(TreeError::DocumentAsChild(child));
        }
        if !self.nodes[parent.0].is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        // "If node is a host-including inclusive ancestor of parent, then throw"
        if child == parent || self.is_descendant_of(parent, child) {
            return Err(TreeError::HierarchyCycle { parent, child });
        }
        Ok(())
    }

    fn index_in(&self, parent: NodeId, child: NodeId) -> usize {
        self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == child)
            .unwrap_or(self.nodes[parent.0].children.len())
    }

    /// Append an already-detached node. Callers have validated the pair.
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.link_at(parent, index, child);
    }

    fn link_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let siblings = &mut self.nodes[parent.0].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        let prev = index.checked_sub(1).map(|i| siblings[i]);
        let next = siblings.get(index + 1).copied();

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = Some(child);
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = Some(child);
        }
    }

    /// [§ 4.2.3 remove](https://dom.spec.whatwg.org/#concept-node-remove)
    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.0].parent else {
            return;
        };
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;
        self.nodes[parent.0].children.retain(|&c| c != child);
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }
}
