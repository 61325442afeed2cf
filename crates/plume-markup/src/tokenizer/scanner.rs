//! The streaming tokenizer.
//!
//! Input arrives in chunks. The tokenizer keeps only the unconsumed tail of
//! the stream in `buffer`, starting at `section_start`, and tracks the
//! absolute offset of `buffer[0]` so events carry stream positions. All
//! delimiters are ASCII, so every slice boundary falls on a UTF-8 character
//! boundary even though scanning is bytewise.

use memchr::{memchr, memchr2};
use plume_common::tags::{is_raw_text_element, is_verbatim_element};

use super::sink::{QuoteKind, TokenSink};
use super::state::State;
use crate::entities::{CharRef, EntityMode, decode_char_ref};

const CDATA_START: &[u8] = b"CDATA[";
const COMMENT_END: &[u8] = b"-->";
const CDATA_END: &[u8] = b"]]>";

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// XML rules: no verbatim elements, XML entity table, permissive tag names.
    pub xml_mode: bool,
    /// Decode character references in text and attribute values.
    pub decode_entities: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            xml_mode: false,
            decode_entities: true,
        }
    }
}

/// The verbatim element whose body is being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Special {
    /// Lowercase tag name, matched against the closing tag.
    name: String,
    /// `title` and `textarea` decode references, `script` and `style` do not.
    decodes: bool,
}

/// Streaming markup tokenizer.
///
/// Feed it with [`write`](Self::write) any number of times, then call
/// [`end`](Self::end). Splitting the input differently never changes the
/// sequence of events beyond where text runs are cut.
#[derive(Debug)]
pub struct Tokenizer {
    options: TokenizerOptions,
    state: State,
    /// State to return to after a character reference.
    base_state: State,
    buffer: String,
    /// Absolute stream offset of `buffer[0]`.
    offset: usize,
    index: usize,
    section_start: usize,
    /// When true, the main loop does not advance past the current byte.
    reconsume: bool,
    running: bool,
    end_requested: bool,
    at_eof: bool,
    ended: bool,
    /// Absolute offset of the `<` that opened the current markup.
    tag_start: usize,
    sequence_index: usize,
    comment_end: &'static [u8],
    special: Option<Special>,
    pending_special: Option<Special>,
    closing_name: String,
}

impl Tokenizer {
    /// Create a tokenizer in the initial text state.
    #[must_use]
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            options,
            state: State::Text,
            base_state: State::Text,
            buffer: String::new(),
            offset: 0,
            index: 0,
            section_start: 0,
            reconsume: false,
            running: true,
            end_requested: false,
            at_eof: false,
            ended: false,
            tag_start: 0,
            sequence_index: 0,
            comment_end: COMMENT_END,
            special: None,
            pending_special: None,
            closing_name: String::new(),
        }
    }

    /// Options this tokenizer was built with.
    #[must_use]
    pub const fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// Current state, mostly useful in tests and traces.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Absolute offset of the next byte to be scanned.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset + self.index
    }

    /// Whether [`pause`](Self::pause) is in effect.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        !self.running
    }

    /// Whether the end of the stream has been processed.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Append a chunk and scan as far as it allows. Ignored after the end.
    pub fn write<S: TokenSink>(&mut self, chunk: &str, sink: &mut S) {
        if self.ended || self.end_requested {
            return;
        }
        self.buffer.push_str(chunk);
        if self.running {
            self.parse(sink);
        }
    }

    /// Finish the stream. While paused, this takes effect on resume.
    pub fn end<S: TokenSink>(&mut self, sink: &mut S) {
        if self.ended {
            return;
        }
        self.end_requested = true;
        if self.running {
            self.finish(sink);
        }
    }

    /// Stop producing events. Written input is buffered.
    pub const fn pause(&mut self) {
        self.running = false;
    }

    /// Resume event production, scanning everything buffered meanwhile.
    pub fn resume<S: TokenSink>(&mut self, sink: &mut S) {
        if self.running || self.ended {
            return;
        }
        self.running = true;
        self.parse(sink);
        if self.end_requested {
            self.finish(sink);
        }
    }

    /// Drop all buffered input and return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new(self.options);
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    fn parse<S: TokenSink>(&mut self, sink: &mut S) {
        while self.running {
            if self.state == State::InEntity {
                if self.step_entity(sink) {
                    continue;
                }
                break;
            }
            let Some(&c) = self.buffer.as_bytes().get(self.index) else {
                break;
            };
            match self.state {
                State::Text => self.state_text(c, sink),
                State::BeforeTagName => self.state_before_tag_name(c),
                State::InTagName => self.state_in_tag_name(c, sink),
                State::InSelfClosingTag => self.state_in_self_closing_tag(c, sink),
                State::BeforeClosingTagName => self.state_before_closing_tag_name(c),
                State::InClosingTagName => self.state_in_closing_tag_name(c),
                State::AfterClosingTagName => self.state_after_closing_tag_name(c, sink),
                State::BeforeAttributeName => self.state_before_attribute_name(c, sink),
                State::InAttributeName => self.state_in_attribute_name(c, sink),
                State::AfterAttributeName => self.state_after_attribute_name(c, sink),
                State::BeforeAttributeValue => self.state_before_attribute_value(c),
                State::InAttributeValueDq => self.state_in_quoted_value(c, b'"', sink),
                State::InAttributeValueSq => self.state_in_quoted_value(c, b'\'', sink),
                State::InAttributeValueNq => self.state_in_unquoted_value(c, sink),
                State::BeforeDeclaration => self.state_before_declaration(c),
                State::InDeclaration | State::InProcessingInstruction => {
                    self.state_in_declaration(c, sink);
                }
                State::BeforeComment => self.state_before_comment(c),
                State::CDataSequence => self.state_cdata_sequence(c),
                State::InSpecialComment => self.state_in_special_comment(c, sink),
                State::InCommentLike => self.state_in_comment_like(c, sink),
                State::InSpecialTag => self.state_in_special_tag(c, sink),
                State::SpecialEndSequence => self.state_special_end_sequence(c),
                State::InEntity => {}
            }
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.index += 1;
            }
        }
        self.cleanup(sink);
    }

    /// Flush what can be flushed at a chunk boundary and discard consumed input.
    fn cleanup<S: TokenSink>(&mut self, sink: &mut S) {
        if self.running {
            match self.state {
                State::Text | State::InSpecialTag => self.flush_text(self.index, sink),
                state if state.is_attribute_value() => self.flush_attribute_data(self.index, sink),
                _ => {}
            }
        }
        if !self.state.retains_section() {
            self.section_start = self.index;
        }
        let cut = self.section_start.min(self.index);
        if cut > 0 {
            self.buffer.replace_range(..cut, "");
            self.offset += cut;
            self.index -= cut;
            self.section_start -= cut;
        }
    }

    fn finish<S: TokenSink>(&mut self, sink: &mut S) {
        self.at_eof = true;
        self.parse(sink);
        self.handle_trailing_data(sink);
        self.ended = true;
        sink.on_end();
    }

    /// Whatever is left at end-of-stream: text-like states become text, an
    /// open comment or CDATA body is emitted as such, and a half-written tag
    /// is dropped.
    fn handle_trailing_data<S: TokenSink>(&mut self, sink: &mut S) {
        let start = self.section_start;
        let end = self.buffer.len();
        if start >= end {
            return;
        }
        let data = &self.buffer[start..end];
        let (abs_start, abs_end) = (self.offset + start, self.offset + end);
        match self.state {
            State::InCommentLike if self.comment_end == CDATA_END => {
                sink.on_cdata(data, self.tag_start, abs_end);
            }
            State::InCommentLike | State::InSpecialComment => {
                sink.on_comment(data, self.tag_start, abs_end);
            }
            state if state.is_inside_tag() => {
                log::trace!(
                    target: "plume.tokenizer",
                    "dropping unterminated tag data in {state} at offset {abs_start}"
                );
            }
            _ => sink.on_text(data, abs_start, abs_end),
        }
        self.section_start = end;
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn switch_to(&mut self, state: State) {
        log::trace!(target: "plume.tokenizer", "{} -> {}", self.state, state);
        self.state = state;
    }

    fn reconsume_in(&mut self, state: State) {
        self.switch_to(state);
        self.reconsume = true;
    }

    /// Jump to `found` (a position relative to `index + 1`) or to the end of
    /// the buffer, without consuming the byte landed on.
    fn skip_to(&mut self, found: Option<usize>) {
        self.index = found.map_or(self.buffer.len(), |rel| self.index + 1 + rel);
        self.reconsume = true;
    }

    fn rest(&self) -> &[u8] {
        self.buffer
            .as_bytes()
            .get(self.index + 1..)
            .unwrap_or_default()
    }

    const fn abs(&self, index: usize) -> usize {
        self.offset + index
    }

    const fn entity_mode(&self) -> EntityMode {
        if self.options.xml_mode {
            EntityMode::Xml
        } else {
            EntityMode::Html
        }
    }

    fn is_tag_start(&self, c: u8) -> bool {
        c.is_ascii_alphabetic()
            || (self.options.xml_mode && !is_whitespace(c) && !matches!(c, b'/' | b'>' | b'<'))
    }

    fn flush_text<S: TokenSink>(&mut self, end: usize, sink: &mut S) {
        if self.section_start < end {
            let text = &self.buffer[self.section_start..end];
            sink.on_text(text, self.abs(self.section_start), self.abs(end));
        }
        self.section_start = end;
    }

    fn flush_attribute_data<S: TokenSink>(&mut self, end: usize, sink: &mut S) {
        if self.section_start < end {
            let data = &self.buffer[self.section_start..end];
            sink.on_attribute_data(data, self.abs(self.section_start), self.abs(end));
        }
        self.section_start = end;
    }

    fn begin_entity(&mut self) {
        self.base_state = self.state;
        self.section_start = self.index;
        self.switch_to(State::InEntity);
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// `section_start` is the `&`. Returns false when more input is needed.
    fn step_entity<S: TokenSink>(&mut self, sink: &mut S) -> bool {
        let amp = self.section_start;
        let in_attribute = self.base_state.is_attribute_value();
        let input = self.buffer.get(amp + 1..).unwrap_or_default();
        match decode_char_ref(input, self.entity_mode(), in_attribute, self.at_eof) {
            CharRef::Resolved { value, consumed } => {
                let end = amp + 1 + consumed;
                let (start, stop) = (self.abs(amp), self.abs(end));
                if in_attribute {
                    sink.on_attribute_data(&value, start, stop);
                } else {
                    sink.on_text(&value, start, stop);
                }
                self.section_start = end;
                self.index = end;
            }
            CharRef::Literal => {
                // The '&' stays in the section and is emitted with what follows.
                self.index = amp + 1;
            }
            CharRef::Incomplete => {
                self.index = self.buffer.len();
                return false;
            }
        }
        self.switch_to(self.base_state);
        true
    }

    // =========================================================================
    // States
    // =========================================================================

    fn state_text<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c == b'<' {
            self.flush_text(self.index, sink);
            self.tag_start = self.abs(self.index);
            self.switch_to(State::BeforeTagName);
        } else if c == b'&' && self.options.decode_entities {
            self.flush_text(self.index, sink);
            self.begin_entity();
        } else if self.options.decode_entities {
            let found = memchr2(b'<', b'&', self.rest());
            self.skip_to(found);
        } else {
            let found = memchr(b'<', self.rest());
            self.skip_to(found);
        }
    }

    fn state_before_tag_name(&mut self, c: u8) {
        match c {
            b'!' => self.switch_to(State::BeforeDeclaration),
            b'?' => self.switch_to(State::InProcessingInstruction),
            b'/' => self.switch_to(State::BeforeClosingTagName),
            _ if self.is_tag_start(c) => {
                self.section_start = self.index;
                self.switch_to(State::InTagName);
            }
            // Not markup: the '<' stays in the text section.
            _ => self.reconsume_in(State::Text),
        }
    }

    fn state_in_tag_name<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if !is_end_of_tag_section(c) {
            return;
        }
        let name = &self.buffer[self.section_start..self.index];
        sink.on_open_tag_name(name, self.tag_start, self.abs(self.index));
        self.pending_special = (!self.options.xml_mode && is_verbatim_element(name)).then(|| {
            Special {
                name: name.to_ascii_lowercase(),
                decodes: !is_raw_text_element(name),
            }
        });
        self.section_start = self.index;
        self.reconsume_in(State::BeforeAttributeName);
    }

    fn state_before_attribute_name<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        match c {
            b'>' => {
                sink.on_open_tag_end(self.abs(self.index + 1));
                if let Some(special) = self.pending_special.take() {
                    self.special = Some(special);
                    self.switch_to(State::InSpecialTag);
                } else {
                    self.switch_to(State::Text);
                }
                self.section_start = self.index + 1;
            }
            b'/' => self.switch_to(State::InSelfClosingTag),
            _ if is_whitespace(c) => {}
            _ => {
                self.section_start = self.index;
                self.switch_to(State::InAttributeName);
            }
        }
    }

    fn state_in_self_closing_tag<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c == b'>' {
            sink.on_self_closing_tag(self.abs(self.index + 1));
            self.pending_special = None;
            self.switch_to(State::Text);
            self.section_start = self.index + 1;
        } else {
            self.reconsume_in(State::BeforeAttributeName);
        }
    }

    fn state_in_attribute_name<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c == b'=' || is_end_of_tag_section(c) {
            let name = &self.buffer[self.section_start..self.index];
            sink.on_attribute_name(name, self.abs(self.section_start), self.abs(self.index));
            self.section_start = self.index;
            self.reconsume_in(State::AfterAttributeName);
        }
    }

    fn state_after_attribute_name<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        match c {
            b'=' => self.switch_to(State::BeforeAttributeValue),
            b'/' | b'>' => {
                sink.on_attribute_end(QuoteKind::NoValue, self.abs(self.index));
                self.reconsume_in(State::BeforeAttributeName);
            }
            _ if is_whitespace(c) => {}
            _ => {
                sink.on_attribute_end(QuoteKind::NoValue, self.abs(self.index));
                self.section_start = self.index;
                self.switch_to(State::InAttributeName);
            }
        }
    }

    fn state_before_attribute_value(&mut self, c: u8) {
        match c {
            b'"' => {
                self.section_start = self.index + 1;
                self.switch_to(State::InAttributeValueDq);
            }
            b'\'' => {
                self.section_start = self.index + 1;
                self.switch_to(State::InAttributeValueSq);
            }
            _ if is_whitespace(c) => {}
            _ => {
                self.section_start = self.index;
                self.reconsume_in(State::InAttributeValueNq);
            }
        }
    }

    fn state_in_quoted_value<S: TokenSink>(&mut self, c: u8, quote: u8, sink: &mut S) {
        if c == quote {
            self.flush_attribute_data(self.index, sink);
            let kind = if quote == b'"' {
                QuoteKind::Double
            } else {
                QuoteKind::Single
            };
            sink.on_attribute_end(kind, self.abs(self.index + 1));
            self.switch_to(State::BeforeAttributeName);
        } else if c == b'&' && self.options.decode_entities {
            self.flush_attribute_data(self.index, sink);
            self.begin_entity();
        } else if self.options.decode_entities {
            let found = memchr2(quote, b'&', self.rest());
            self.skip_to(found);
        } else {
            let found = memchr(quote, self.rest());
            self.skip_to(found);
        }
    }

    fn state_in_unquoted_value<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if is_whitespace(c) || c == b'>' {
            self.flush_attribute_data(self.index, sink);
            sink.on_attribute_end(QuoteKind::Unquoted, self.abs(self.index));
            self.reconsume_in(State::BeforeAttributeName);
        } else if c == b'&' && self.options.decode_entities {
            self.flush_attribute_data(self.index, sink);
            self.begin_entity();
        }
    }

    fn state_before_closing_tag_name(&mut self, c: u8) {
        match c {
            b'>' => {
                // `</>` is dropped entirely.
                self.switch_to(State::Text);
                self.section_start = self.index + 1;
            }
            _ if is_whitespace(c) => {}
            _ if self.is_tag_start(c) => {
                self.section_start = self.index;
                self.switch_to(State::InClosingTagName);
            }
            _ => {
                self.section_start = self.index;
                self.switch_to(State::InSpecialComment);
            }
        }
    }

    fn state_in_closing_tag_name(&mut self, c: u8) {
        if is_end_of_tag_section(c) {
            self.closing_name.clear();
            self.closing_name
                .push_str(&self.buffer[self.section_start..self.index]);
            self.reconsume_in(State::AfterClosingTagName);
        }
    }

    fn state_after_closing_tag_name<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c == b'>' {
            sink.on_close_tag(&self.closing_name, self.tag_start, self.abs(self.index + 1));
            self.switch_to(State::Text);
            self.section_start = self.index + 1;
        } else {
            let found = memchr(b'>', self.rest());
            self.skip_to(found);
        }
    }

    fn state_before_declaration(&mut self, c: u8) {
        match c {
            b'[' => {
                self.sequence_index = 0;
                self.switch_to(State::CDataSequence);
            }
            b'-' => self.switch_to(State::BeforeComment),
            _ => self.reconsume_in(State::InDeclaration),
        }
    }

    fn state_before_comment(&mut self, c: u8) {
        if c == b'-' {
            self.comment_end = COMMENT_END;
            self.sequence_index = 0;
            self.section_start = self.index + 1;
            self.switch_to(State::InCommentLike);
        } else {
            self.reconsume_in(State::InDeclaration);
        }
    }

    fn state_cdata_sequence(&mut self, c: u8) {
        if CDATA_START.get(self.sequence_index) == Some(&c) {
            self.sequence_index += 1;
            if self.sequence_index == CDATA_START.len() {
                self.comment_end = CDATA_END;
                self.sequence_index = 0;
                self.section_start = self.index + 1;
                self.switch_to(State::InCommentLike);
            }
        } else {
            self.sequence_index = 0;
            self.reconsume_in(State::InDeclaration);
        }
    }

    /// `<!...>` and `<?...>`; `section_start` is still the `<`.
    fn state_in_declaration<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c != b'>' {
            let found = memchr(b'>', self.rest());
            self.skip_to(found);
            return;
        }
        let data = &self.buffer[self.section_start + 1..self.index];
        let end = self.abs(self.index + 1);
        if self.state == State::InProcessingInstruction {
            sink.on_processing_instruction(data, self.tag_start, end);
        } else {
            sink.on_declaration(data, self.tag_start, end);
        }
        self.switch_to(State::Text);
        self.section_start = self.index + 1;
    }

    fn state_in_special_comment<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        if c == b'>' {
            let data = &self.buffer[self.section_start..self.index];
            sink.on_comment(data, self.tag_start, self.abs(self.index + 1));
            self.switch_to(State::Text);
            self.section_start = self.index + 1;
        } else {
            let found = memchr(b'>', self.rest());
            self.skip_to(found);
        }
    }

    /// Shared body matcher for comments and CDATA, keyed off the 3-byte
    /// terminator in `comment_end`.
    fn state_in_comment_like<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        let terminator = self.comment_end;
        if c == terminator[self.sequence_index] {
            self.sequence_index += 1;
            if self.sequence_index == terminator.len() {
                let data_end = self.index + 1 - terminator.len();
                let data = &self.buffer[self.section_start..data_end];
                let end = self.abs(self.index + 1);
                if terminator == CDATA_END {
                    sink.on_cdata(data, self.tag_start, end);
                } else {
                    sink.on_comment(data, self.tag_start, end);
                }
                self.sequence_index = 0;
                self.section_start = self.index + 1;
                self.switch_to(State::Text);
            }
        } else if self.sequence_index == 0 {
            let found = memchr(terminator[0], self.rest());
            self.skip_to(found);
        } else if c != terminator[self.sequence_index - 1] {
            // `--->` and `]]]>` keep the partial match alive.
            self.sequence_index = 0;
        }
    }

    fn state_in_special_tag<S: TokenSink>(&mut self, c: u8, sink: &mut S) {
        let decodes = self.options.decode_entities
            && self.special.as_ref().is_some_and(|special| special.decodes);
        if c == b'<' {
            self.flush_text(self.index, sink);
            self.tag_start = self.abs(self.index);
            self.sequence_index = 0;
            self.switch_to(State::SpecialEndSequence);
        } else if c == b'&' && decodes {
            self.flush_text(self.index, sink);
            self.begin_entity();
        } else if decodes {
            let found = memchr2(b'<', b'&', self.rest());
            self.skip_to(found);
        } else {
            let found = memchr(b'<', self.rest());
            self.skip_to(found);
        }
    }

    /// Matching `/name` after a `<` in a verbatim body. A mismatch falls back
    /// to the body, where the `<` is ordinary text.
    fn state_special_end_sequence(&mut self, c: u8) {
        let Some(name) = self.special.as_ref().map(|s| s.name.as_bytes()) else {
            self.reconsume_in(State::Text);
            return;
        };
        let name_len = name.len();
        let matched = match self.sequence_index {
            0 => c == b'/',
            i if i <= name_len => c.to_ascii_lowercase() == name[i - 1],
            _ => {
                if is_end_of_tag_section(c) {
                    self.special = None;
                    self.section_start = self.index - name_len;
                    self.reconsume_in(State::InClosingTagName);
                } else {
                    self.reconsume_in(State::InSpecialTag);
                }
                return;
            }
        };
        if matched {
            self.sequence_index += 1;
        } else {
            self.reconsume_in(State::InSpecialTag);
        }
    }
}

const fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

const fn is_end_of_tag_section(c: u8) -> bool {
    c == b'/' || c == b'>' || is_whitespace(c)
}
