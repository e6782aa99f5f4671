//! Locations of tokens and tree nodes within source text

use std::fmt::{Display, Formatter};

/// A trait that can provide the [Span] of an item.
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A region of source text.
///
/// `offset` and `len` are in bytes, `line` and `col` are 1-based and count characters.
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Span {
    offset: usize,
    len: usize,
    line: usize,
    col: usize,
}

impl Span {
    /// Creates a new span
    pub const fn new(offset: usize, len: usize, line: usize, col: usize) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn line(&self) -> usize {
        self.line
    }

    pub const fn col(&self) -> usize {
        self.col
    }

    /// Creates the smallest span that covers both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        let (first, last) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let end = (first.offset + first.len).max(last.offset + last.len);
        Span {
            offset: first.offset,
            len: end - first.offset,
            line: first.line,
            col: first.col,
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// A line read by a [LineReader]
#[derive(Debug)]
pub struct Line<'a> {
    pub line: usize,
    pub src: &'a str,
}

/// Reads the lines around a span
#[derive(Debug)]
pub struct LineReader {
    before: usize,
    after: usize,
}

impl LineReader {
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Gets the lines of `source` surrounding the line `span` starts on.
    pub fn lines<'a>(&self, source: &'a str, span: &Span) -> Vec<Line<'a>> {
        let first = span.line().saturating_sub(self.before).max(1);
        let last = span.line() + self.after;
        source
            .lines()
            .enumerate()
            .map(|(idx, src)| Line { line: idx + 1, src })
            .skip_while(|line| line.line < first)
            .take_while(|line| line.line <= last)
            .collect()
    }
}
