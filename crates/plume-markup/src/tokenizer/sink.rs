/// How an attribute value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// No value at all: `<input disabled>`.
    NoValue,
    /// `name=value`
    Unquoted,
    /// `name='value'`
    Single,
    /// `name="value"`
    Double,
}

/// Receiver for tokenizer events.
///
/// All offsets are absolute byte positions in the logical input stream,
/// across every chunk written so far. `start..end` ranges are half-open.
/// Text and attribute values may arrive in several pieces; consecutive
/// pieces belong together.
pub trait TokenSink {
    /// A run of character data, already decoded.
    fn on_text(&mut self, text: &str, start: usize, end: usize);
    /// The name of an opening tag; `start` is the offset of `<`.
    fn on_open_tag_name(&mut self, name: &str, start: usize, end: usize);
    /// The `>` closing an opening tag, at `end - 1`.
    fn on_open_tag_end(&mut self, end: usize);
    /// The `/>` closing an opening tag; `end - 1` is the `>`.
    fn on_self_closing_tag(&mut self, end: usize);
    /// An attribute name inside the current opening tag.
    fn on_attribute_name(&mut self, name: &str, start: usize, end: usize);
    /// A piece of the current attribute value, already decoded.
    fn on_attribute_data(&mut self, data: &str, start: usize, end: usize);
    /// The current attribute is complete.
    fn on_attribute_end(&mut self, quote: QuoteKind, end: usize);
    /// A complete closing tag; `start` is the `<`, `end - 1` the `>`.
    fn on_close_tag(&mut self, name: &str, start: usize, end: usize);
    /// Everything between `<` and `>` of a `<!...>` declaration.
    fn on_declaration(&mut self, data: &str, start: usize, end: usize);
    /// Everything between `<` and `>` of a `<?...>` instruction.
    fn on_processing_instruction(&mut self, data: &str, start: usize, end: usize);
    /// A comment body without its delimiters.
    fn on_comment(&mut self, data: &str, start: usize, end: usize);
    /// A CDATA body without its delimiters.
    fn on_cdata(&mut self, data: &str, start: usize, end: usize);
    /// The input stream is finished.
    fn on_end(&mut self);
}
