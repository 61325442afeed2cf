//! Text extraction.

use plume_common::tags::is_verbatim_element;

use crate::{DomTree, NodeId, NodeType};

impl DomTree {
    /// Concatenated text of `id` and all its descendants, CDATA included.
    /// Comments and processing instructions contribute nothing.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.collect_text(id, None, false)
    }

    /// Like [`text_content`](Self::text_content), but every element named
    /// `break_tag` (ASCII case-insensitive) becomes a `\n`.
    #[must_use]
    pub fn text_with_breaks(&self, id: NodeId, break_tag: &str) -> String {
        self.collect_text(id, Some(break_tag), false)
    }

    /// Human-visible text: `<br>` becomes a newline and the bodies of
    /// verbatim elements (`script`, `style`, `title`, `textarea`) are left out.
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        self.collect_text(id, Some("br"), true)
    }

    fn collect_text(&self, id: NodeId, break_tag: Option<&str>, skip_verbatim: bool) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            match &node.node_type {
                NodeType::Text(data) => out.push_str(data),
                NodeType::Element(data) => {
                    if break_tag.is_some_and(|b| data.tag_name.eq_ignore_ascii_case(b)) {
                        out.push('\n');
                        continue;
                    }
                    if skip_verbatim && is_verbatim_element(&data.tag_name) {
                        continue;
                    }
                    stack.extend(node.children.iter().rev().copied());
                }
                NodeType::Document | NodeType::CData => {
                    stack.extend(node.children.iter().rev().copied());
                }
                NodeType::Comment(_) | NodeType::ProcessingInstruction { .. } => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_and_verbatim_bodies() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let a = tree.create_text("A");
        let br = tree.create_element("br");
        let b = tree.create_text("B");
        let script = tree.create_element("script");
        let code = tree.create_text("x()");
        let note = tree.create_comment("note");
        for child in [a, br, b, script, note] {
            tree.append_child(p, child).unwrap();
        }
        tree.append_child(script, code).unwrap();

        assert_eq!(tree.text_content(p), "ABx()");
        assert_eq!(tree.text_with_breaks(p, "BR"), "A\nBx()");
        assert_eq!(tree.inner_text(p), "A\nB");
    }
}
