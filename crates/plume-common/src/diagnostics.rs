//! Parse diagnostics with an injectable sink.
//!
//! The parser and tree builder never fail on malformed markup; they recover
//! and keep going. What they recovered from is reported here, to whatever
//! sink the caller hands in. Nothing in this module is global.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use strum_macros::Display;

/// How serious a reported irregularity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Severity {
    /// Informational, e.g. an implied close tag.
    #[strum(serialize = "info")]
    Info,
    /// Markup was malformed and something was dropped or reinterpreted.
    #[strum(serialize = "warning")]
    Warning,
    /// API misuse surfaced to the caller.
    #[strum(serialize = "error")]
    Error,
}

/// A single recoverable irregularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the irregularity.
    pub severity: Severity,
    /// Which stage reported it ("tokenizer", "parser", "builder").
    pub component: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Absolute offset into the input stream, if known.
    pub position: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic without a source position.
    #[must_use]
    pub fn new(severity: Severity, component: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            component,
            message: message.into(),
            position: None,
        }
    }

    /// Attach an absolute source offset.
    #[must_use]
    pub const fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}] {}", self.component, self.severity, self.message)?;
        if let Some(pos) = self.position {
            write!(f, " at offset {pos}")?;
        }
        Ok(())
    }
}

/// Receiver for parse diagnostics.
pub trait DiagnosticsSink {
    /// Record one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F> DiagnosticsSink for F
where
    F: FnMut(Diagnostic),
{
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade under the `plume` target.
///
/// With [`LogSink::deduplicated`] each distinct `component`/`message` pair is
/// logged only once, which keeps long documents with a repeated fault from
/// flooding the log.
#[derive(Debug, Default)]
pub struct LogSink {
    seen: Option<HashSet<String>>,
}

impl LogSink {
    /// Log every diagnostic.
    #[must_use]
    pub const fn new() -> Self {
        Self { seen: None }
    }

    /// Log each distinct message once.
    #[must_use]
    pub fn deduplicated() -> Self {
        Self {
            seen: Some(HashSet::new()),
        }
    }
}

impl DiagnosticsSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if let Some(seen) = self.seen.as_mut() {
            let key = format!("[{}] {}", diagnostic.component, diagnostic.message);
            if !seen.insert(key) {
                return;
            }
        }
        match diagnostic.severity {
            Severity::Info => log::debug!(target: "plume", "{diagnostic}"),
            Severity::Warning => log::warn!(target: "plume", "{diagnostic}"),
            Severity::Error => log::error!(target: "plume", "{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic for later inspection.
///
/// Clones share the same record list, so a caller can keep one handle and
/// give the other to a parser.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.borrow().clone()
    }

    /// Number of records at or above `severity`.
    #[must_use]
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|d| d.severity >= severity)
            .count()
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.records.borrow_mut().push(diagnostic);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_shares_records_between_clones() {
        let sink = CollectingSink::new();
        let mut handle = sink.clone();
        handle.report(Diagnostic::new(Severity::Warning, "parser", "unmatched </b>").at(7));
        handle.report(Diagnostic::new(Severity::Info, "parser", "implied </li>"));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, Some(7));
        assert_eq!(sink.count_at_least(Severity::Warning), 1);

        sink.clear();
        assert!(handle.records().is_empty());
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |d: Diagnostic| seen.push(d.message);
            sink.report(Diagnostic::new(Severity::Info, "builder", "reset"));
        }
        assert_eq!(seen, vec!["reset".to_string()]);
    }

    #[test]
    fn display_includes_position() {
        let d = Diagnostic::new(Severity::Warning, "tokenizer", "unterminated comment").at(42);
        assert_eq!(
            d.to_string(),
            "[tokenizer warning] unterminated comment at offset 42"
        );
    }
}
