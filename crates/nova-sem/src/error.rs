use nova_util::{Diagnostic, Span, ToDiagnostic};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate definition of function '{name}' at line {line}")]
    DuplicateFunction { name: String, line: u32 },

    #[error("parameter '{name}' of function '{func}' has no declared type, at line {line}")]
    MissingParamType {
        func: String,
        name: String,
        line: u32,
    },

    #[error("duplicate parameter '{name}' in function '{func}', at line {line}")]
    DuplicateParam {
        func: String,
        name: String,
        line: u32,
    },

    #[error("function '{name}' declares {count} parameters; Nova supports at most 6, at line {line}")]
    TooManyParams { name: String, count: usize, line: u32 },

    #[error("unknown type '{name}'")]
    UnknownType { name: String, line: u32 },

    #[error("unknown name '{name}' at line {line}")]
    UnknownName { name: String, line: u32 },

    #[error("call to '{name}' passes {got} argument(s), expected {expected}, at line {line}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        line: u32,
    },

    #[error("call to '{name}' is not a known function or built-in, at line {line}")]
    UnknownCallee { name: String, line: u32 },

    #[error(
        "expected type '{expected}', found '{found}' at line {line}"
    )]
    Mismatch {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("operator '{op}' requires operands of type '{expected}', found '{found}' at line {line}")]
    OperandType {
        op: String,
        expected: String,
        found: String,
        line: u32,
    },

    #[error("'void' function cannot return a value, at line {line}")]
    VoidReturnsValue { line: u32 },

    #[error("function '{name}' must return a value of type '{expected}', at line {line}")]
    MissingReturnValue { name: String, expected: String, line: u32 },
}

impl TypeError {
    pub fn line(&self) -> u32 {
        match self {
            TypeError::DuplicateFunction { line, .. }
            | TypeError::MissingParamType { line, .. }
            | TypeError::DuplicateParam { line, .. }
            | TypeError::TooManyParams { line, .. }
            | TypeError::UnknownType { line, .. }
            | TypeError::UnknownName { line, .. }
            | TypeError::ArityMismatch { line, .. }
            | TypeError::UnknownCallee { line, .. }
            | TypeError::Mismatch { line, .. }
            | TypeError::OperandType { line, .. }
            | TypeError::VoidReturnsValue { line }
            | TypeError::MissingReturnValue { line, .. } => *line,
        }
    }
}

impl ToDiagnostic for TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string()).with_span(Span::point(0, self.line(), 0))
    }
}
