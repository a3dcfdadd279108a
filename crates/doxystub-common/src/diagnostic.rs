//! Non-fatal diagnostics accumulated over a batch.
//!
//! Fatal conditions are errors of the crate that detects them; everything the
//! pipeline can recover from is recorded as a [`Diagnostic`] and reported in
//! aggregate once the batch completes.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// What kind of recoverable condition a diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// An entity could not compute a fully qualified name.
    Qualification,
    /// A member or node kind the model has no variant for.
    Unclassified,
    /// A type expression that did not bind to any known entity.
    UnresolvedType,
}

#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("{message}")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
    pub message: String,
    #[help]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            kind,
            message: message.into(),
            help: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            kind,
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
