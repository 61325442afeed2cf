//! Common utilities for the Plume markup core.
//!
//! This crate provides shared infrastructure used by the DOM and the parser:
//! - **Diagnostics** - an injectable sink for recoverable parse irregularities
//! - **Tag tables** - element categories shared by the parser and serializer

pub mod diagnostics;
pub mod tags;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink, LogSink, NullSink, Severity};
