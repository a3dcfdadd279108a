use miette::Diagnostic;
use thiserror::Error;

use crate::validate::SyntaxError;

/// Fatal conditions of a batch.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    #[error("failed to load the Python grammar: {0}")]
    #[diagnostic(code(doxystub::grammar))]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("{class} '{qualified_name}' is still invalid after {attempts} repair(s): {reason}")]
    #[diagnostic(
        code(doxystub::repair_exhausted),
        help("last rendering:\n{rendering}")
    )]
    RepairExhausted {
        class: &'static str,
        qualified_name: String,
        attempts: usize,
        rendering: String,
        reason: SyntaxError,
    },

    #[error("emitted unit '{qualified_name}' is not valid Python: {reason}")]
    #[diagnostic(code(doxystub::invalid_unit), help("rendering:\n{rendering}"))]
    InvalidUnit {
        qualified_name: String,
        rendering: String,
        reason: SyntaxError,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
