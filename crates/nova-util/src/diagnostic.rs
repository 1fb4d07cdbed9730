//! Severity-tagged, span-tagged human-readable messages.
//!
//! The pipeline stages never print anything themselves; they return
//! [`crate::CompileError`] values, and the driver turns those into
//! [`Diagnostic`]s for display. Kept separate from the error enums so a
//! future caller (an IDE integration, say) can collect diagnostics without
//! matching on error variants.

use crate::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{}: {} (line {}, column {})",
                self.severity, self.message, span.line, span.column
            ),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}
