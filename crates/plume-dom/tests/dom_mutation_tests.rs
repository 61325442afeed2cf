//! Tests for DOM tree mutation: append/prepend, sibling insertion, removal,
//! replacement, moving children and the error contract.

use plume_dom::{DomTree, NodeId, TreeError};

/// Helper to create an element attached under `parent`.
fn element_under(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(tag);
    tree.append_child(parent, id).unwrap();
    id
}

/// Assert that sibling pointers agree with the parent's child list.
fn assert_consistent(tree: &DomTree, parent: NodeId) {
    let children = tree.children(parent);
    for (i, &child) in children.iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        let prev = i.checked_sub(1).map(|j| children[j]);
        assert_eq!(tree.prev_sibling(child), prev);
        assert_eq!(tree.next_sibling(child), children.get(i + 1).copied());
    }
}

// ========== append / prepend ==========

#[test]
fn test_append_child_links_last() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");

    assert_eq!(tree.children(div), &[a, b]);
    assert_eq!(tree.last_child(div), Some(b));
    assert_consistent(&tree, div);
}

#[test]
fn test_append_child_moves_from_previous_location() {
    let mut tree = DomTree::new();
    let left = element_under(&mut tree, NodeId::ROOT, "left");
    let right = element_under(&mut tree, NodeId::ROOT, "right");
    let a = element_under(&mut tree, left, "a");
    let b = element_under(&mut tree, left, "b");

    tree.append_child(right, a).unwrap();

    assert_eq!(tree.children(left), &[b]);
    assert_eq!(tree.children(right), &[a]);
    assert_eq!(tree.parent(a), Some(right));
    assert_consistent(&tree, left);
    assert_consistent(&tree, right);
}

#[test]
fn test_append_child_within_same_parent_reorders() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");
    let c = element_under(&mut tree, div, "c");

    tree.append_child(div, a).unwrap();

    assert_eq!(tree.children(div), &[b, c, a]);
    assert_consistent(&tree, div);
}

#[test]
fn test_prepend_child() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = tree.create_text("b");

    tree.prepend_child(div, b).unwrap();

    assert_eq!(tree.children(div), &[b, a]);
    assert_eq!(tree.first_child(div), Some(b));
    assert_consistent(&tree, div);
}

// ========== siblings ==========

#[test]
fn test_append_and_prepend_sibling() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let c = element_under(&mut tree, div, "c");
    let b = tree.create_element("b");
    let z = tree.create_element("z");

    tree.append_sibling(a, b).unwrap();
    tree.prepend_sibling(a, z).unwrap();

    assert_eq!(tree.children(div), &[z, a, b, c]);
    assert_consistent(&tree, div);
}

#[test]
fn test_append_sibling_of_last_child() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");

    tree.append_sibling(b, a).unwrap();

    assert_eq!(tree.children(div), &[b, a]);
    assert_consistent(&tree, div);
}

#[test]
fn test_root_cannot_get_a_sibling() {
    let mut tree = DomTree::new();
    let x = tree.create_element("x");
    assert_eq!(
        tree.append_sibling(NodeId::ROOT, x),
        Err(TreeError::NoParent(NodeId::ROOT))
    );
    assert_eq!(tree.parent(x), None);
}

#[test]
fn test_insert_before() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let c = element_under(&mut tree, div, "c");
    let b = tree.create_element("b");

    tree.insert_before(div, b, c).unwrap();
    assert_eq!(tree.children(div), &[a, b, c]);

    // Moving an existing child further left.
    tree.insert_before(div, c, a).unwrap();
    assert_eq!(tree.children(div), &[c, a, b]);
    assert_consistent(&tree, div);
}

#[test]
fn test_insert_before_requires_reference_child() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let stranger = element_under(&mut tree, NodeId::ROOT, "span");
    let b = tree.create_element("b");

    assert_eq!(
        tree.insert_before(div, b, stranger),
        Err(TreeError::NotAChild {
            parent: div,
            child: stranger
        })
    );
}

// ========== removal / replacement ==========

#[test]
fn test_remove_from_tree_detaches_fully() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");
    let c = element_under(&mut tree, div, "c");
    let inner = element_under(&mut tree, b, "i");

    tree.remove_from_tree(b).unwrap();

    assert_eq!(tree.children(div), &[a, c]);
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), None);
    // The detached node keeps its own subtree.
    assert_eq!(tree.children(b), &[inner]);
    assert_consistent(&tree, div);

    // Removing again is a no-op.
    tree.remove_from_tree(b).unwrap();
    assert_eq!(tree.children(div), &[a, c]);
}

#[test]
fn test_remove_child_checks_parent() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let other = element_under(&mut tree, NodeId::ROOT, "p");
    let a = element_under(&mut tree, div, "a");

    assert_eq!(
        tree.remove_child(other, a),
        Err(TreeError::NotAChild {
            parent: other,
            child: a
        })
    );
    tree.remove_child(div, a).unwrap();
    assert!(tree.children(div).is_empty());
}

#[test]
fn test_replace_with() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");
    let c = element_under(&mut tree, div, "c");
    let x = tree.create_text("x");

    tree.replace_with(b, x).unwrap();

    assert_eq!(tree.children(div), &[a, x, c]);
    assert_eq!(tree.parent(b), None);
    assert_consistent(&tree, div);
}

#[test]
fn test_replace_with_a_sibling() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, div, "a");
    let b = element_under(&mut tree, div, "b");
    let c = element_under(&mut tree, div, "c");

    tree.replace_with(c, a).unwrap();

    assert_eq!(tree.children(div), &[b, a]);
    assert_consistent(&tree, div);
}

// ========== move_children ==========

#[test]
fn test_move_children_preserves_order() {
    let mut tree = DomTree::new();
    let from = element_under(&mut tree, NodeId::ROOT, "from");
    let to = element_under(&mut tree, NodeId::ROOT, "to");
    let existing = element_under(&mut tree, to, "x");
    let a = element_under(&mut tree, from, "a");
    let b = element_under(&mut tree, from, "b");

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, a, b]);
    assert_consistent(&tree, to);
}

#[test]
fn test_move_children_into_own_subtree_fails() {
    let mut tree = DomTree::new();
    let from = element_under(&mut tree, NodeId::ROOT, "from");
    let a = element_under(&mut tree, from, "a");
    let deep = element_under(&mut tree, a, "deep");

    assert_eq!(
        tree.move_children(from, deep),
        Err(TreeError::HierarchyCycle {
            parent: deep,
            child: a
        })
    );
    assert_eq!(tree.children(from), &[a]);
}

// ========== error contract ==========

#[test]
fn test_cycles_are_rejected_and_tree_unchanged() {
    let mut tree = DomTree::new();
    let outer = element_under(&mut tree, NodeId::ROOT, "outer");
    let inner = element_under(&mut tree, outer, "inner");

    assert_eq!(
        tree.append_child(inner, outer),
        Err(TreeError::HierarchyCycle {
            parent: inner,
            child: outer
        })
    );
    assert_eq!(
        tree.append_child(outer, outer),
        Err(TreeError::HierarchyCycle {
            parent: outer,
            child: outer
        })
    );
    assert_eq!(tree.children(NodeId::ROOT), &[outer]);
    assert_eq!(tree.children(outer), &[inner]);
}

#[test]
fn test_leaf_nodes_cannot_hold_children() {
    let mut tree = DomTree::new();
    let text = tree.create_text("t");
    let comment = tree.create_comment("c");
    let child = tree.create_element("b");

    assert_eq!(
        tree.append_child(text, child),
        Err(TreeError::NotAContainer(text))
    );
    assert_eq!(
        tree.prepend_child(comment, child),
        Err(TreeError::NotAContainer(comment))
    );
}

#[test]
fn test_document_and_unknown_handles() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    assert_eq!(
        tree.append_child(div, NodeId::ROOT),
        Err(TreeError::DocumentAsChild(NodeId::ROOT))
    );
    assert_eq!(
        tree.append_child(div, NodeId(1000)),
        Err(TreeError::UnknownNode(NodeId(1000)))
    );
    assert_eq!(
        tree.remove_from_tree(NodeId(1000)),
        Err(TreeError::UnknownNode(NodeId(1000)))
    );
}

#[test]
fn test_cdata_is_a_container() {
    let mut tree = DomTree::new();
    let cdata = tree.create_cdata("raw");
    tree.append_child(NodeId::ROOT, cdata).unwrap();
    assert_eq!(tree.children(cdata).len(), 1);
    assert_eq!(tree.text_content(NodeId::ROOT), "raw");
}
