//! Markup parser.
//!
//! Wraps a [`Tokenizer`] and enforces tag nesting: an open-tag stack,
//! implicit-close rules, first-wins attributes and forced closes at end of
//! input. The result is a stream of balanced [`Handler`] calls.

mod driver;
mod handler;
mod rules;

use plume_common::{DiagnosticsSink, LogSink};

use self::driver::ParserCore;
pub use self::handler::{CloseKind, Handler, Span};
pub use self::rules::MarkupRules;
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::tokenizer::Tokenizer;

/// Streaming markup parser driving a [`Handler`].
///
/// ```
/// use plume_markup::{Handler, ParseOptions, Parser, Span};
/// use plume_dom::Attributes;
///
/// #[derive(Default)]
/// struct Tags(Vec<String>);
///
/// impl Handler for Tags {
///     fn on_open_tag(&mut self, name: &str, _: Attributes, _: bool, _: Span) {
///         self.0.push(name.to_string());
///     }
/// }
///
/// let mut parser = Parser::new(Tags::default(), &ParseOptions::default());
/// parser.write("<ul><li>one<li>two</ul>").unwrap();
/// parser.end().unwrap();
/// assert_eq!(parser.handler().0, ["ul", "li", "li"]);
/// ```
pub struct Parser<H: Handler> {
    tokenizer: Tokenizer,
    core: ParserCore<H>,
    /// `end` has been called.
    finished: bool,
}

impl<H: Handler> Parser<H> {
    /// Create a parser with the rule tables `options` select and
    /// diagnostics forwarded to the `log` facade.
    #[must_use]
    pub fn new(handler: H, options: &ParseOptions) -> Self {
        Self {
            tokenizer: Tokenizer::new(options.tokenizer_options()),
            core: ParserCore::new(handler, *options, Box::new(LogSink::new())),
            finished: false,
        }
    }

    /// Replace the void and implicit-close tables.
    #[must_use]
    pub fn with_rules(mut self, rules: MarkupRules) -> Self {
        self.core.rules = rules;
        self
    }

    /// Send recoverable irregularities to `sink` instead of the log.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.core.diagnostics = Box::new(sink);
        self
    }

    /// Options this parser was built with.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.core.options
    }

    /// Active rule tables.
    #[must_use]
    pub const fn rules(&self) -> &MarkupRules {
        &self.core.rules
    }

    /// Names of the elements currently open, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> &[String] {
        self.core.open_elements()
    }

    /// Feed a chunk of input.
    ///
    /// # Errors
    ///
    /// [`ParseError::WriteAfterEnd`] once [`end`](Self::end) was called. The
    /// error is also passed to [`Handler::on_error`].
    pub fn write(&mut self, chunk: &str) -> Result<(), ParseError> {
        if self.finished {
            return Err(self.fail(ParseError::WriteAfterEnd));
        }
        self.tokenizer.write(chunk, &mut self.core);
        Ok(())
    }

    /// Signal the end of input. Open elements are closed, then
    /// [`Handler::on_end`] runs. While paused this waits for
    /// [`resume`](Self::resume).
    ///
    /// # Errors
    ///
    /// [`ParseError::EndAfterEnd`] on a second call. The error is also passed
    /// to [`Handler::on_error`].
    pub fn end(&mut self) -> Result<(), ParseError> {
        if self.finished {
            return Err(self.fail(ParseError::EndAfterEnd));
        }
        self.finished = true;
        self.tokenizer.end(&mut self.core);
        Ok(())
    }

    /// Stop delivering events; further input is buffered.
    pub const fn pause(&mut self) {
        self.tokenizer.pause();
    }

    /// Deliver everything buffered while paused, and a deferred end.
    pub fn resume(&mut self) {
        self.tokenizer.resume(&mut self.core);
    }

    /// Whether the parser is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.tokenizer.is_paused()
    }

    /// Whether end of input has been fully processed.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.tokenizer.is_ended()
    }

    /// Return to the initial state so the parser can be reused. The handler
    /// is told through [`Handler::on_reset`].
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.core.reset();
        self.finished = false;
        self.core.handler.on_reset();
    }

    /// Reset, then parse `text` as a whole document.
    ///
    /// # Errors
    ///
    /// Never in practice; the signature matches [`write`](Self::write).
    pub fn parse_complete(&mut self, text: &str) -> Result<(), ParseError> {
        self.reset();
        self.write(text)?;
        self.end()
    }

    /// The handler.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.core.handler
    }

    /// The handler, mutably.
    pub const fn handler_mut(&mut self) -> &mut H {
        &mut self.core.handler
    }

    /// Consume the parser and return its handler.
    #[must_use]
    pub fn into_handler(self) -> H {
        self.core.handler
    }

    fn fail(&mut self, error: ParseError) -> ParseError {
        log::debug!(target: "plume.parser", "{error}");
        self.core.handler.on_error(error);
        error
    }
}

impl<H: Handler + std::fmt::Debug> std::fmt::Debug for Parser<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("tokenizer", &self.tokenizer)
            .field("handler", &self.core.handler)
            .field("open_elements", &self.core.open_elements())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
