use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use ctl::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A logged update names a block the target does not have.
    BlockNotFound(String),
    /// The serialized log is not an array of entries, or an entry lacks a
    /// required field.
    MalformedChangeLog(String),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::BlockNotFound(name) => write!(f, "block '{}' not found in model", name),
            ReplayError::MalformedChangeLog(msg) => write!(f, "malformed change log: {}", msg),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<StoreError> for ReplayError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::BlockNotFound(name) => ReplayError::BlockNotFound(name),
        }
    }
}

/// A replay error enriched with the failing entry and, when known, its
/// location in the change log source.
#[derive(Debug)]
pub struct DiagnosticError {
    pub error: ReplayError,
    /// Zero-based index of the entry that failed.
    pub entry: Option<usize>,
    pub span: Option<Range<usize>>,
    pub source_id: usize,
}

impl DiagnosticError {
    pub fn at_entry(error: ReplayError, entry: usize, source_id: usize) -> Self {
        DiagnosticError {
            error,
            entry: Some(entry),
            span: None,
            source_id,
        }
    }

    pub fn at_span(error: ReplayError, span: Range<usize>, source_id: usize) -> Self {
        DiagnosticError {
            error,
            entry: None,
            span: Some(span),
            source_id,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::new(Severity::Error).with_message(self.to_string());
        if let Some(span) = &self.span {
            diagnostic = diagnostic.with_labels(vec![Label::primary(self.source_id, span.clone())]);
        }
        if let Some(entry) = self.entry {
            diagnostic = diagnostic.with_notes(vec![format!("while replaying entry {}", entry)]);
        }
        diagnostic
    }
}

impl From<ReplayError> for DiagnosticError {
    fn from(error: ReplayError) -> Self {
        DiagnosticError {
            error,
            entry: None,
            span: None,
            source_id: 0,
        }
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for DiagnosticError {}
