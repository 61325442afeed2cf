//! Errors surfaced to callers of the parser.

use thiserror::Error;

/// API misuse of a parser instance. Malformed markup is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `write` was called after `end`.
    #[error(".write() after done")]
    WriteAfterEnd,
    /// `end` was called a second time.
    #[error(".end() after done")]
    EndAfterEnd,
}
