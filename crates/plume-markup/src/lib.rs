//! Streaming markup parsing for the Plume markup core.
//!
//! Input flows through three stages:
//!
//! 1. [`Tokenizer`] turns chunks of text into lexical events.
//! 2. [`Parser`] enforces tag nesting and emits balanced [`Handler`] calls.
//! 3. [`TreeBuilder`] turns those calls into a [`plume_dom::DomTree`].
//!
//! [`parse_document`] and [`create_incremental_parser`] wire the three
//! together. Malformed markup never fails; only API misuse such as writing
//! after the end returns a [`ParseError`].

pub mod builder;
pub mod entities;
mod error;
mod incremental;
mod options;
pub mod parser;
pub mod tokenizer;

pub use builder::TreeBuilder;
pub use entities::{EntityMode, decode_entities};
pub use error::ParseError;
pub use incremental::{IncrementalParser, create_incremental_parser, parse_document};
pub use options::ParseOptions;
pub use parser::{CloseKind, Handler, MarkupRules, Parser, Span};
pub use tokenizer::{Tokenizer, TokenizerOptions};
