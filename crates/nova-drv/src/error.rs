use nova_util::ToDiagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// The shared error supertype: every pipeline-stage error converts into
/// this one variant via `#[from]`, so the driver matches once instead of
/// threading four separate error types through `main`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Lex(#[from] nova_lex::LexError),

    #[error(transparent)]
    Parse(#[from] nova_par::ParseError),

    #[error(transparent)]
    Type(#[from] nova_sem::TypeError),

    #[error("the {0:?} backend is not implemented")]
    UnsupportedTarget(crate::cli::Target),
}

impl CompileError {
    /// The user-facing diagnostic line, span-qualified where available.
    pub fn report(&self) -> String {
        match self {
            CompileError::Lex(e) => e.to_diagnostic().to_string(),
            CompileError::Parse(e) => e.to_diagnostic().to_string(),
            CompileError::Type(e) => e.to_diagnostic().to_string(),
            other => other.to_string(),
        }
    }
}
