//! Source positions.
//!
//! Nova compiles a single source file per invocation, so a [`Span`] is just
//! a byte range plus the one-based line/column of its start — no
//! [`FileId`](crate) indirection is needed the way a multi-file compiler
//! would want one.

/// A half-open byte range into the source text, tagged with the human
/// facing line and column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A zero-width span at a single position, used for synthesized nodes
    /// (e.g. an implicit `void` return type) that have no literal source
    /// text of their own.
    pub fn point(pos: usize, line: u32, column: u32) -> Self {
        Self::new(pos, pos, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_has_zero_width() {
        let s = Span::point(5, 2, 3);
        assert_eq!(s.start, s.end);
        assert_eq!(s.line, 2);
        assert_eq!(s.column, 3);
    }
}
