//! Shared data model for the Nova compiler: source spans and diagnostics.
//!
//! Every pipeline stage (`nova-lex`, `nova-par`, `nova-sem`, `nova-gen`)
//! defines its own closed `thiserror` error enum and implements
//! [`ToDiagnostic`] for it; the driver crate is the one place all four
//! stages meet, so the unified error supertype that wraps them lives there
//! rather than here (an enum can't name variants of crates that depend on
//! it).

mod diagnostic;
mod span;

pub use diagnostic::{Diagnostic, Severity};
pub use span::Span;

/// Converts a stage-specific error into the span-tagged message the driver
/// prints. Implemented once per error enum rather than matched ad hoc at
/// every call site.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}
