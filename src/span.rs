// src/span.rs
//
// Source positions carried by type-expression nodes and diagnostics.

use miette::SourceSpan;

/// A byte span with line/column info, as produced by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(start: u32, end: u32, line: u32, col: u32) -> Self {
        Self {
            start,
            end,
            line,
            col,
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}

/// Convert an optional node span into the SourceSpan a diagnostic label needs.
/// Synthesized nodes have no span; they label offset zero.
pub fn to_source_span(span: Option<Span>) -> SourceSpan {
    span.map(Into::into).unwrap_or_else(|| (0, 0).into())
}
