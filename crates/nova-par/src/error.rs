use nova_util::{Diagnostic, Span, ToDiagnostic};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, found {found} at line {line}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("call target must be an identifier, at line {line}")]
    NonIdentifierCallee { line: u32 },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            ParseError::UnexpectedToken { line, .. } => *line,
            ParseError::NonIdentifierCallee { line } => *line,
        }
    }
}

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string()).with_span(Span::point(0, self.line(), 0))
    }
}
