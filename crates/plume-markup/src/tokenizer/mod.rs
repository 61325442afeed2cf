//! Streaming markup tokenizer.
//!
//! A finite-state scanner that turns a chunked character stream into
//! lexical events delivered to a [`TokenSink`].

mod scanner;
mod sink;
mod state;

pub use scanner::{Tokenizer, TokenizerOptions};
pub use sink::{QuoteKind, TokenSink};
pub use state::State;
