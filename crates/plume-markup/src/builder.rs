//! Tree construction from parser events.

use plume_common::{Diagnostic, DiagnosticsSink, LogSink, Severity};
use plume_dom::{Attributes, DomTree, ElementData, NodeId, NodeType};

use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::parser::{CloseKind, Handler, Span};

const COMPONENT: &str = "builder";

/// Called with the tree and the element that was just closed.
pub type ElementCallback = Box<dyn FnMut(&DomTree, NodeId)>;

/// Called once per parse with the finished tree or the first error.
pub type CompleteCallback = Box<dyn FnMut(Result<&DomTree, ParseError>)>;

/// A [`Handler`] that builds a [`DomTree`].
///
/// Open containers are kept on a stack with the document at the bottom; every
/// new node becomes the last child of the innermost one. Adjacent text runs
/// are merged into one node, and so are the pieces of one comment.
pub struct TreeBuilder {
    tree: DomTree,
    stack: Vec<NodeId>,
    /// Text or comment node that the next matching event extends.
    last_node: Option<NodeId>,
    with_start_indices: bool,
    with_end_indices: bool,
    on_element_closed: Option<ElementCallback>,
    on_complete: Option<CompleteCallback>,
    /// `on_complete` already fired for the current parse.
    done: bool,
    diagnostics: Box<dyn DiagnosticsSink>,
}

impl TreeBuilder {
    /// Builder recording source offsets as `options` ask.
    #[must_use]
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            tree: DomTree::new(),
            stack: vec![NodeId::ROOT],
            last_node: None,
            with_start_indices: options.with_start_indices,
            with_end_indices: options.with_end_indices,
            on_element_closed: None,
            on_complete: None,
            done: false,
            diagnostics: Box::new(LogSink::new()),
        }
    }

    /// Call `callback` every time an element is closed.
    #[must_use]
    pub fn on_element_closed(mut self, callback: impl FnMut(&DomTree, NodeId) + 'static) -> Self {
        self.on_element_closed = Some(Box::new(callback));
        self
    }

    /// Call `callback` when the parse finishes or first fails.
    #[must_use]
    pub fn on_complete(
        mut self,
        callback: impl FnMut(Result<&DomTree, ParseError>) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Report builder irregularities to `sink` instead of the log.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.set_diagnostics(sink);
        self
    }

    /// Replace the diagnostics sink in place.
    pub fn set_diagnostics(&mut self, sink: impl DiagnosticsSink + 'static) {
        self.diagnostics = Box::new(sink);
    }

    /// The tree built so far. Valid at any point during the parse.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Take the tree out of the builder.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// Whether the parse has finished or failed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Allocate `node_type` and attach it under the innermost container.
    fn add_node(&mut self, node_type: NodeType, span: Span) -> NodeId {
        let id = self.tree.alloc(node_type);
        if let Some(node) = self.tree.get_mut(id) {
            if self.with_start_indices {
                node.start_index = Some(span.start);
            }
            if self.with_end_indices {
                node.end_index = Some(span.last());
            }
        }
        let parent = self.current();
        if let Err(err) = self.tree.append_child(parent, id) {
            self.diagnostics.report(
                Diagnostic::new(Severity::Error, COMPONENT, err.to_string()).at(span.start),
            );
        }
        id
    }

    /// Append to the pending text or comment node when it has the wanted
    /// kind. Returns false when a new node is needed.
    fn extend_last(&mut self, data: &str, span: Span, comment: bool) -> bool {
        let Some(node) = self.last_node.and_then(|id| self.tree.get_mut(id)) else {
            return false;
        };
        match &mut node.node_type {
            NodeType::Text(text) if !comment => text.push_str(data),
            NodeType::Comment(text) if comment => text.push_str(data),
            _ => return false,
        }
        if self.with_end_indices {
            node.end_index = Some(span.last());
        }
        true
    }

    fn complete(&mut self, result: Result<(), ParseError>) {
        if self.done {
            return;
        }
        self.done = true;
        if let Some(callback) = self.on_complete.as_mut() {
            callback(result.map(|()| &self.tree));
        }
    }
}

impl Handler for TreeBuilder {
    fn on_open_tag(&mut self, name: &str, attrs: Attributes, self_closing: bool, span: Span) {
        self.last_node = None;
        let data = ElementData {
            tag_name: name.to_string(),
            attrs,
            self_closing,
        };
        let id = self.add_node(NodeType::Element(data), span);
        log::trace!(target: "plume.builder", "element <{name}> as {id:?}");
        self.stack.push(id);
    }

    fn on_close_tag(&mut self, _name: &str, _kind: CloseKind, span: Span) {
        self.last_node = None;
        if self.stack.len() <= 1 {
            return;
        }
        let Some(id) = self.stack.pop() else {
            return;
        };
        if let Some(node) = self.tree.get_mut(id).filter(|_| self.with_end_indices) {
            node.end_index = Some(span.last());
        }
        if let Some(callback) = self.on_element_closed.as_mut() {
            callback(&self.tree, id);
        }
    }

    fn on_text(&mut self, text: &str, span: Span) {
        if !self.extend_last(text, span, false) {
            let id = self.add_node(NodeType::Text(text.to_string()), span);
            self.last_node = Some(id);
        }
    }

    fn on_comment(&mut self, data: &str, span: Span) {
        if !self.extend_last(data, span, true) {
            let id = self.add_node(NodeType::Comment(data.to_string()), span);
            self.last_node = Some(id);
        }
    }

    fn on_comment_end(&mut self) {
        self.last_node = None;
    }

    fn on_cdata_start(&mut self, span: Span) {
        let cdata = self.add_node(NodeType::CData, span);
        self.stack.push(cdata);
        let text = self.add_node(NodeType::Text(String::new()), span);
        self.last_node = Some(text);
    }

    fn on_cdata_end(&mut self) {
        self.last_node = None;
        if self.stack.len() > 1 {
            let _ = self.stack.pop();
        }
    }

    fn on_processing_instruction(&mut self, name: &str, data: &str, span: Span) {
        self.last_node = None;
        let node_type = NodeType::ProcessingInstruction {
            name: name.to_string(),
            data: data.to_string(),
        };
        let _ = self.add_node(node_type, span);
    }

    fn on_error(&mut self, error: ParseError) {
        self.diagnostics
            .report(Diagnostic::new(Severity::Error, COMPONENT, error.to_string()));
        self.complete(Err(error));
    }

    fn on_end(&mut self) {
        log::trace!(target: "plume.builder", "tree complete with {} node(s)", self.tree.len());
        self.complete(Ok(()));
    }

    fn on_reset(&mut self) {
        self.tree = DomTree::new();
        self.stack = vec![NodeId::ROOT];
        self.last_node = None;
        self.done = false;
    }
}

impl std::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("tree", &self.tree)
            .field("stack", &self.stack)
            .field("last_node", &self.last_node)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(builder: &mut TreeBuilder, name: &str, start: usize, end: usize) {
        builder.on_open_tag(name, Attributes::new(), false, Span::new(start, end));
    }

    #[test]
    fn adjacent_text_is_merged() {
        let mut builder = TreeBuilder::new(&ParseOptions::default());
        open(&mut builder, "p", 0, 3);
        builder.on_text("a", Span::new(3, 4));
        builder.on_text("&", Span::new(4, 9));
        builder.on_text("b", Span::new(9, 10));
        builder.on_close_tag("p", CloseKind::Explicit, Span::new(10, 14));

        let tree = builder.into_tree();
        let p = tree.document_element().unwrap();
        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text_content(p), "a&b");
    }

    #[test]
    fn comment_end_stops_merging() {
        let mut builder = TreeBuilder::new(&ParseOptions::default());
        builder.on_comment("x", Span::new(0, 8));
        builder.on_comment_end();
        builder.on_comment("y", Span::new(8, 16));
        builder.on_comment_end();
        assert_eq!(builder.tree().children(NodeId::ROOT).len(), 2);
    }

    #[test]
    fn indices_are_recorded_when_asked() {
        let options = ParseOptions::default().with_indices(true, true);
        let mut builder = TreeBuilder::new(&options);
        open(&mut builder, "b", 2, 5);
        builder.on_close_tag("b", CloseKind::Explicit, Span::new(5, 9));

        let tree = builder.tree();
        let b = tree.document_element().unwrap();
        let node = tree.get(b).unwrap();
        assert_eq!(node.start_index, Some(2));
        assert_eq!(node.end_index, Some(8));
    }

    #[test]
    fn close_without_open_element_keeps_root() {
        let mut builder = TreeBuilder::new(&ParseOptions::default());
        builder.on_close_tag("x", CloseKind::Explicit, Span::new(0, 4));
        builder.on_text("t", Span::new(4, 5));
        assert_eq!(builder.tree().children(NodeId::ROOT).len(), 1);
    }
}
