//! Tag-nesting discipline on top of the tokenizer.
//!
//! `ParserCore` receives lexical events, keeps the stack of open tag names
//! and turns everything into balanced [`Handler`] calls. It never fails:
//! stray close tags are dropped and unclosed tags are closed for the caller.

use std::borrow::Cow;

use plume_common::{Diagnostic, DiagnosticsSink, Severity};
use plume_dom::Attributes;

use super::handler::{CloseKind, Handler, Span};
use super::rules::MarkupRules;
use crate::options::ParseOptions;
use crate::tokenizer::{QuoteKind, TokenSink};

const COMPONENT: &str = "parser";

pub(super) struct ParserCore<H> {
    pub(super) handler: H,
    pub(super) rules: MarkupRules,
    pub(super) options: ParseOptions,
    pub(super) diagnostics: Box<dyn DiagnosticsSink>,
    stack: Vec<String>,
    tag_name: String,
    tag_start: usize,
    /// `Some` while an opening tag is being read.
    attribs: Option<Attributes>,
    attrib_name: String,
    attrib_value: String,
    attrib_start: usize,
    /// End offset of the latest event; force-closes at end of input land here.
    position: usize,
}

impl<H: Handler> ParserCore<H> {
    pub(super) fn new(
        handler: H,
        options: ParseOptions,
        diagnostics: Box<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            handler,
            rules: options.rules(),
            options,
            diagnostics,
            stack: Vec::new(),
            tag_name: String::new(),
            tag_start: 0,
            attribs: None,
            attrib_name: String::new(),
            attrib_value: String::new(),
            attrib_start: 0,
            position: 0,
        }
    }

    /// Forget every open tag and any half-read tag.
    pub(super) fn reset(&mut self) {
        self.stack.clear();
        self.tag_name.clear();
        self.attribs = None;
        self.attrib_name.clear();
        self.attrib_value.clear();
        self.tag_start = 0;
        self.attrib_start = 0;
        self.position = 0;
    }

    /// Names of the currently open elements, outermost first.
    pub(super) fn open_elements(&self) -> &[String] {
        &self.stack
    }

    fn report(&mut self, severity: Severity, message: String, position: usize) {
        self.diagnostics
            .report(Diagnostic::new(severity, COMPONENT, message).at(position));
    }

    fn fold_tag<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.options.fold_tag_name_case {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }

    fn advance(&mut self, end: usize) {
        self.position = self.position.max(end);
    }

    /// Pop the innermost element and report it closed.
    fn close_top(&mut self, kind: CloseKind, span: Span) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        if kind == CloseKind::Implied {
            self.report(Severity::Info, format!("implied </{name}>"), span.start);
        }
        log::trace!(target: "plume.parser", "close <{name}> ({kind})");
        self.handler.on_close_tag(&name, kind, span);
    }

    /// `>` or `/>` ended the opening tag: apply implicit closes, announce
    /// the element and close it right away if it cannot have content.
    fn finish_open_tag(&mut self, end: usize, self_closing: bool) {
        let Some(attrs) = self.attribs.take() else {
            return;
        };
        let name = std::mem::take(&mut self.tag_name);
        let start = self.tag_start;
        while self
            .stack
            .last()
            .is_some_and(|open| self.rules.implies_close(&name, open))
        {
            self.close_top(CloseKind::Implied, Span::new(start, start));
        }

        let span = Span::new(start, end);
        log::trace!(target: "plume.parser", "open <{name}> with {} attribute(s)", attrs.len());
        self.handler.on_open_tag(&name, attrs, self_closing, span);
        if self_closing {
            self.handler.on_close_tag(&name, CloseKind::SelfClosing, span);
        } else if self.rules.is_void(&name) {
            self.handler.on_close_tag(&name, CloseKind::Void, span);
        } else {
            self.stack.push(name);
        }
    }

    fn emit_comment(&mut self, data: &str, span: Span) {
        self.handler.on_comment(data, span);
        self.handler.on_comment_end();
    }
}

impl<H: Handler> TokenSink for ParserCore<H> {
    fn on_text(&mut self, text: &str, start: usize, end: usize) {
        self.advance(end);
        self.handler.on_text(text, Span::new(start, end));
    }

    fn on_open_tag_name(&mut self, name: &str, start: usize, end: usize) {
        self.advance(end);
        self.tag_name = self.fold_tag(name).into_owned();
        self.tag_start = start;
        self.attribs = Some(Attributes::new());
    }

    fn on_open_tag_end(&mut self, end: usize) {
        self.advance(end);
        self.finish_open_tag(end, false);
    }

    fn on_self_closing_tag(&mut self, end: usize) {
        self.advance(end);
        self.finish_open_tag(end, true);
    }

    fn on_attribute_name(&mut self, name: &str, start: usize, end: usize) {
        self.advance(end);
        self.attrib_name.clear();
        if self.options.fold_attribute_name_case {
            self.attrib_name.push_str(&name.to_ascii_lowercase());
        } else {
            self.attrib_name.push_str(name);
        }
        self.attrib_value.clear();
        self.attrib_start = start;
    }

    fn on_attribute_data(&mut self, data: &str, _start: usize, end: usize) {
        self.advance(end);
        self.attrib_value.push_str(data);
    }

    fn on_attribute_end(&mut self, _quote: QuoteKind, end: usize) {
        self.advance(end);
        let Some(attrs) = self.attribs.as_mut() else {
            return;
        };
        let name = std::mem::take(&mut self.attrib_name);
        let value = std::mem::take(&mut self.attrib_value);
        if !attrs.insert_if_absent(name.as_str(), value) {
            let message = format!("duplicate attribute {name:?} on <{}>", self.tag_name);
            self.report(Severity::Warning, message, self.attrib_start);
        }
    }

    fn on_close_tag(&mut self, name: &str, start: usize, end: usize) {
        self.advance(end);
        let name = self.fold_tag(name);
        if self.rules.is_void(&name) {
            log::trace!(target: "plume.parser", "ignoring </{name}> for a void element");
            return;
        }
        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| self.rules.names_match(open, &name))
        else {
            let message = format!("unmatched </{name}>");
            self.report(Severity::Warning, message, start);
            return;
        };
        while self.stack.len() > index + 1 {
            self.close_top(CloseKind::Implied, Span::new(start, start));
        }
        self.close_top(CloseKind::Explicit, Span::new(start, end));
    }

    fn on_declaration(&mut self, data: &str, start: usize, end: usize) {
        self.advance(end);
        let raw_name = data
            .split(|c: char| c.is_ascii_whitespace() || c == '/')
            .next()
            .unwrap_or_default();
        let name = self.fold_tag(raw_name).into_owned();
        self.handler
            .on_processing_instruction(&name, data, Span::new(start, end));
    }

    fn on_processing_instruction(&mut self, data: &str, start: usize, end: usize) {
        self.on_declaration(data, start, end);
    }

    fn on_comment(&mut self, data: &str, start: usize, end: usize) {
        self.advance(end);
        self.emit_comment(data, Span::new(start, end));
    }

    fn on_cdata(&mut self, data: &str, start: usize, end: usize) {
        self.advance(end);
        let span = Span::new(start, end);
        if self.options.effective_cdata_as_text() {
            self.handler.on_cdata_start(span);
            self.handler.on_text(data, span);
            self.handler.on_cdata_end();
        } else {
            self.emit_comment(&format!("[CDATA[{data}]]"), span);
        }
    }

    fn on_end(&mut self) {
        let at = self.position;
        while !self.stack.is_empty() {
            self.close_top(CloseKind::Implied, Span::new(at, at));
        }
        log::trace!(target: "plume.parser", "end of input at offset {at}");
        self.handler.on_end();
    }
}
