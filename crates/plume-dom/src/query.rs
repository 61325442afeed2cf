//! Predicate and tag-name searches.
//!
//! All searches are depth-first pre-order and run on an explicit stack of
//! child slices, so tree depth never touches the call stack.

use crate::{DomTree, Node, NodeId};

impl DomTree {
    /// Test each node in `nodes` (and, when `recursive`, their descendants)
    /// against `predicate`, stopping after `limit` matches.
    ///
    /// The given nodes themselves are candidates.
    pub fn find_in<P>(
        &self,
        nodes: &[NodeId],
        recursive: bool,
        limit: usize,
        mut predicate: P,
    ) -> Vec<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        let mut found = Vec::new();
        if limit == 0 {
            return found;
        }
        let mut stack: Vec<(&[NodeId], usize)> = vec![(nodes, 0)];
        while let Some(frame) = stack.last_mut() {
            let (slice, index) = *frame;
            let Some(&id) = slice.get(index) else {
                let _ = stack.pop();
                continue;
            };
            frame.1 += 1;
            let Some(node) = self.get(id) else {
                continue;
            };
            if predicate(node) {
                found.push(id);
                if found.len() >= limit {
                    break;
                }
            }
            if recursive && !node.children.is_empty() {
                stack.push((&node.children, 0));
            }
        }
        found
    }

    /// Every descendant of `scope` (children only unless `recursive`) that
    /// satisfies `predicate`, in document order. `scope` itself is excluded.
    pub fn find_all<P>(&self, scope: NodeId, recursive: bool, predicate: P) -> Vec<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.find_in(self.children(scope), recursive, usize::MAX, predicate)
    }

    /// First match of [`find_all`](Self::find_all).
    pub fn find_one<P>(&self, scope: NodeId, recursive: bool, predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.find_in(self.children(scope), recursive, 1, predicate)
            .first()
            .copied()
    }

    /// Whether any descendant of `scope` satisfies `predicate`.
    pub fn has_one<P>(&self, scope: NodeId, recursive: bool, predicate: P) -> bool
    where
        P: FnMut(&Node) -> bool,
    {
        self.find_one(scope, recursive, predicate).is_some()
    }

    /// Elements under `scope` whose tag name is exactly `tag_name`.
    #[must_use]
    pub fn elements_by_tag_name(
        &self,
        scope: NodeId,
        tag_name: &str,
        recursive: bool,
    ) -> Vec<NodeId> {
        self.find_all(scope, recursive, |n| n.tag_name() == Some(tag_name))
    }

    /// First element under `scope` whose tag name is exactly `tag_name`.
    #[must_use]
    pub fn first_element_by_tag_name(
        &self,
        scope: NodeId,
        tag_name: &str,
        recursive: bool,
    ) -> Option<NodeId> {
        self.find_one(scope, recursive, |n| n.tag_name() == Some(tag_name))
    }

    /// First element under `scope` carrying `id="..."`.
    #[must_use]
    pub fn element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.find_one(scope, true, |n| {
            n.as_element().and_then(|e| e.id()) == Some(id)
        })
    }
}
