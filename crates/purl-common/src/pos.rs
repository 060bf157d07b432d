use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::span::{LineIndex, Span};

/// A source position: which file, and the line/column within it.
///
/// Every AST node and every type node carries one of these (data model
/// invariant: "every AST and type node has a position"). Positions are
/// computed from a byte-offset [`Span`] plus a [`LineIndex`] at the point a
/// node is built, rather than threading the index through every later pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pos {
    pub file: Arc<str>,
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(file: Arc<str>, line: u32, col: u32) -> Self {
        Self { file, line, col }
    }

    /// Resolve a byte-offset span's start into a position within `file`.
    pub fn from_span(file: Arc<str>, index: &LineIndex, span: Span) -> Self {
        let (line, col) = index.line_col(span.start);
        Self { file, line, col }
    }

    /// A position with no known source file, for synthetic nodes introduced
    /// by desugaring (e.g. the sentinel difference-record binder).
    pub fn synthetic() -> Self {
        Self {
            file: Arc::from("<synthetic>"),
            line: 0,
            col: 0,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_span_resolves_line_col() {
        let index = LineIndex::new("let x =\n  1\nin x");
        let pos = Pos::from_span(Arc::from("a.pr"), &index, Span::new(10, 11));
        assert_eq!(pos.line, 2);
        assert_eq!(pos.col, 3);
    }

    #[test]
    fn display_format() {
        let pos = Pos::new(Arc::from("a.pr"), 3, 5);
        assert_eq!(pos.to_string(), "a.pr:3:5");
    }
}
