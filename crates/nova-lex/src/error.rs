use nova_util::{Diagnostic, Span, ToDiagnostic};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: u32,
        column: u32,
    },
}

impl LexError {
    pub fn span(&self) -> Span {
        let (line, column) = match *self {
            LexError::UnterminatedString { line, column } => (line, column),
            LexError::UnexpectedCharacter { line, column, .. } => (line, column),
        };
        Span::point(0, line, column)
    }
}

impl ToDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string()).with_span(self.span())
    }
}
