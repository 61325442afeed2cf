//! The callback interface between the parser and whatever builds nodes.

use plume_dom::Attributes;
use strum_macros::Display;

use crate::ParseError;

/// Half-open byte range `start..end` in the logical input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Build a span; `end` is clamped so it never precedes `start`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    /// Offset of the last byte covered. For an empty span this is the byte
    /// just before it, which is where an implicitly closed element ends.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.end.saturating_sub(1)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Why an element was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CloseKind {
    /// A matching `</name>` in the source.
    Explicit,
    /// Closed by an implicit-close rule, an outer close tag or end of input.
    Implied,
    /// Written as `<name/>`.
    SelfClosing,
    /// A void element, which never has content.
    Void,
}

/// Node-construction callbacks produced by the [`Parser`](crate::Parser).
///
/// Every method has an empty default so handlers implement only what they
/// need. Opens and closes are always balanced by the time
/// [`on_end`](Self::on_end) is called.
pub trait Handler {
    /// An element starts.
    fn on_open_tag(&mut self, name: &str, attrs: Attributes, self_closing: bool, span: Span) {
        let _ = (name, attrs, self_closing, span);
    }

    /// The innermost open element ends.
    fn on_close_tag(&mut self, name: &str, kind: CloseKind, span: Span) {
        let _ = (name, kind, span);
    }

    /// Character data. Consecutive calls belong to the same run.
    fn on_text(&mut self, text: &str, span: Span) {
        let _ = (text, span);
    }

    /// Comment content.
    fn on_comment(&mut self, data: &str, span: Span) {
        let _ = (data, span);
    }

    /// The current comment is complete.
    fn on_comment_end(&mut self) {}

    /// A CDATA section starts; its content follows as text.
    fn on_cdata_start(&mut self, span: Span) {
        let _ = span;
    }

    /// The current CDATA section is complete.
    fn on_cdata_end(&mut self) {}

    /// A declaration (`!doctype`) or processing instruction (`?xml`).
    fn on_processing_instruction(&mut self, name: &str, data: &str, span: Span) {
        let _ = (name, data, span);
    }

    /// API misuse reported by the parser.
    fn on_error(&mut self, error: ParseError) {
        let _ = error;
    }

    /// All input has been processed.
    fn on_end(&mut self) {}

    /// The parser was reset; discard any state.
    fn on_reset(&mut self) {}
}
