//! Entry points: one-shot parsing and the incremental parser.

use plume_common::DiagnosticsSink;
use plume_dom::{DomTree, NodeId};

use crate::builder::TreeBuilder;
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::parser::Parser;

/// Parse a whole document.
///
/// ```
/// use plume_markup::{ParseOptions, parse_document};
///
/// let tree = parse_document("<p>A<br>B</p>", &ParseOptions::default());
/// let p = tree.document_element().unwrap();
/// assert_eq!(tree.children(p).len(), 3);
/// ```
#[must_use]
pub fn parse_document(text: &str, options: &ParseOptions) -> DomTree {
    let mut parser = Parser::new(TreeBuilder::new(options), options);
    // A fresh parser accepts one write and one end.
    let _ = parser.write(text);
    let _ = parser.end();
    parser.into_handler().into_tree()
}

/// Build an [`IncrementalParser`] reporting through the given callbacks.
///
/// `on_complete` runs once, with the finished tree after
/// [`end`](IncrementalParser::end) or with the first error.
/// `on_element_closed` runs once for every element as it closes.
pub fn create_incremental_parser<C, E>(
    options: &ParseOptions,
    on_complete: C,
    on_element_closed: E,
) -> IncrementalParser
where
    C: FnMut(Result<&DomTree, ParseError>) + 'static,
    E: FnMut(&DomTree, NodeId) + 'static,
{
    let builder = TreeBuilder::new(options)
        .on_complete(on_complete)
        .on_element_closed(on_element_closed);
    IncrementalParser {
        parser: Parser::new(builder, options),
    }
}

/// A parser that builds a [`DomTree`] from input fed in chunks.
#[derive(Debug)]
pub struct IncrementalParser {
    parser: Parser<TreeBuilder>,
}

impl IncrementalParser {
    /// Parser without callbacks.
    #[must_use]
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            parser: Parser::new(TreeBuilder::new(options), options),
        }
    }

    /// Send parser and builder diagnostics to `sink`.
    #[must_use]
    pub fn with_diagnostics<S>(self, sink: S) -> Self
    where
        S: DiagnosticsSink + Clone + 'static,
    {
        let mut parser = self.parser.with_diagnostics(sink.clone());
        parser.handler_mut().set_diagnostics(sink);
        Self { parser }
    }

    /// Feed a chunk.
    ///
    /// # Errors
    ///
    /// [`ParseError::WriteAfterEnd`] after [`end`](Self::end).
    pub fn write(&mut self, chunk: &str) -> Result<(), ParseError> {
        self.parser.write(chunk)
    }

    /// Finish the document.
    ///
    /// # Errors
    ///
    /// [`ParseError::EndAfterEnd`] on a second call.
    pub fn end(&mut self) -> Result<(), ParseError> {
        self.parser.end()
    }

    /// Suspend tree construction; input keeps being buffered.
    pub const fn pause(&mut self) {
        self.parser.pause();
    }

    /// Continue after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        self.parser.resume();
    }

    /// Drop the tree and all input, ready for a new document.
    pub fn reset(&mut self) {
        self.parser.reset();
    }

    /// Whether the document has been completely processed.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.parser.is_ended()
    }

    /// The tree as built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        self.parser.handler().tree()
    }

    /// Take the tree.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.parser.into_handler().into_tree()
    }
}
