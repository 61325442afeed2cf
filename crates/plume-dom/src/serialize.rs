//! Markup serialization of a subtree.

use std::fmt::Write;

use plume_common::tags::{is_raw_text_element, is_void_element};

use crate::{DomTree, NodeId, NodeType};

/// Serializer knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Render every childless element self-closing and never treat HTML
    /// void or raw-text elements specially.
    pub xml_mode: bool,
}

impl SerializeOptions {
    /// HTML output rules.
    pub const HTML: Self = Self { xml_mode: false };
    /// XML output rules.
    pub const XML: Self = Self { xml_mode: true };
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Escape `&`, `<` and `>` for a text node.
#[must_use]
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Escape `&`, `<`, `>` and `"` for a double-quoted attribute value.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

fn escape(input: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl DomTree {
    /// Markup for `id` including the node itself.
    #[must_use]
    pub fn outer_markup(&self, id: NodeId, options: &SerializeOptions) -> String {
        let mut out = String::new();
        self.serialize_into(&mut out, vec![Step::Open(id)], options);
        out
    }

    /// Markup for the children of `id` only.
    #[must_use]
    pub fn inner_markup(&self, id: NodeId, options: &SerializeOptions) -> String {
        let mut out = String::new();
        let steps = self
            .children(id)
            .iter()
            .rev()
            .map(|&c| Step::Open(c))
            .collect();
        self.serialize_into(&mut out, steps, options);
        out
    }

    fn serialize_into(&self, out: &mut String, mut stack: Vec<Step>, options: &SerializeOptions) {
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(id) => {
                    if let Some(tag) = self.tag_name(id) {
                        let _ = write!(out, "</{tag}>");
                    } else if matches!(
                        self.get(id).map(|n| &n.node_type),
                        Some(NodeType::CData)
                    ) {
                        out.push_str("]]>");
                    }
                    continue;
                }
            };
            let Some(node) = self.get(id) else {
                continue;
            };
            match &node.node_type {
                NodeType::Document => {
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                }
                NodeType::Element(data) => {
                    out.push('<');
                    out.push_str(&data.tag_name);
                    for attr in &data.attrs {
                        let _ = write!(out, " {}=\"{}\"", attr.name, escape_attribute(&attr.value));
                    }
                    if node.children.is_empty() {
                        if options.xml_mode || data.self_closing {
                            out.push_str("/>");
                        } else if is_void_element(&data.tag_name) {
                            out.push('>');
                        } else {
                            let _ = write!(out, "></{}>", data.tag_name);
                        }
                        continue;
                    }
                    out.push('>');
                    stack.push(Step::Close(id));
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                }
                NodeType::Text(text) => {
                    let raw = !options.xml_mode
                        && node
                            .parent
                            .and_then(|p| self.tag_name(p))
                            .is_some_and(is_raw_text_element);
                    let in_cdata = node
                        .parent
                        .and_then(|p| self.get(p))
                        .is_some_and(|p| matches!(p.node_type, NodeType::CData));
                    if raw || in_cdata {
                        out.push_str(text);
                    } else {
                        out.push_str(&escape_text(text));
                    }
                }
                NodeType::Comment(text) => {
                    let _ = write!(out, "<!--{text}-->");
                }
                NodeType::CData => {
                    out.push_str("<![CDATA[");
                    stack.push(Step::Close(id));
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                }
                NodeType::ProcessingInstruction { data, .. } => {
                    let _ = write!(out, "<{data}>");
                }
            }
        }
    }
}
