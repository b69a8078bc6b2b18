//! Source position tracking.
//!
//! A [`Span`] is the sole diagnostic anchor used throughout td12dk: every
//! token, every syntax node, and every annotated-tree node carries one.

use std::fmt;
use std::ops::Add;
use std::rc::Rc;

/// A range of source text: a starting line/column, a length, and (for
/// spans that cover more than one line) a count of additional lines.
///
/// `length` is measured in columns when `extra_lines == 0`; for a
/// multi-line span it is the length of the final line's covered prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub filename: Rc<str>,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub extra_lines: u32,
}

impl Span {
    pub fn new(filename: impl Into<Rc<str>>, line: u32, column: u32, length: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
            length,
            extra_lines: 0,
        }
    }

    pub fn with_extra_lines(
        filename: impl Into<Rc<str>>,
        line: u32,
        column: u32,
        length: u32,
        extra_lines: u32,
    ) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
            length,
            extra_lines,
        }
    }

    /// True when this span's final line is not its first.
    pub fn is_multiline(&self) -> bool {
        self.extra_lines != 0
    }

    /// The (exclusive) column this span ends at on its last line.
    pub fn end_column(&self) -> u32 {
        self.column + self.length
    }

    /// The last line number this span covers.
    pub fn end_line(&self) -> u32 {
        self.line + self.extra_lines
    }

    /// Union of two spans in the same file: starts where `self` starts,
    /// extends through where `other` ends.
    ///
    /// When the two spans start on different lines, `extra_lines` becomes
    /// the line delta and `length` is taken from `other`'s own extent
    /// (its length if it is itself single-line, otherwise its length as
    /// already measured against its own start). When they share a line,
    /// the result stays single-line and `length` is recomputed from the
    /// two column ranges.
    pub fn union(&self, other: &Span) -> Span {
        if self.line != other.line {
            let length = if other.extra_lines == 0 {
                other.column + other.length
            } else {
                other.length
            };
            Span {
                filename: self.filename.clone(),
                line: self.line,
                column: self.column,
                length,
                extra_lines: other.line - self.line,
            }
        } else {
            Span {
                filename: self.filename.clone(),
                line: self.line,
                column: self.column,
                length: (other.column + other.length) - self.column,
                extra_lines: 0,
            }
        }
    }
}

impl Add for &Span {
    type Output = Span;
    fn add(self, other: &Span) -> Span {
        self.union(other)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ln {}, Col {} in file {}", self.line, self.column, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32, column: u32, length: u32) -> Span {
        Span::new("t.td12", line, column, length)
    }

    #[test]
    fn union_start_matches_self() {
        let a = span(1, 3, 2);
        let b = span(1, 10, 4);
        let u = a.union(&b);
        assert_eq!(u.line, a.line);
        assert_eq!(u.column, a.column);
    }

    #[test]
    fn union_same_line_length_law() {
        let a = span(1, 3, 2);
        let b = span(1, 10, 4);
        let u = a.union(&b);
        assert_eq!(u.length, (b.column + b.length) - a.column);
        assert_eq!(u.extra_lines, 0);
    }

    #[test]
    fn union_crosses_lines() {
        let a = span(1, 3, 2);
        let b = span(3, 1, 5);
        let u = a.union(&b);
        assert_eq!(u.extra_lines, 2);
        assert_eq!(u.length, b.column + b.length);
    }

    #[quickcheck_macros::quickcheck]
    fn union_start_is_always_self_start(l1: u32, c1: u32, len1: u32, l2: u32, c2: u32, len2: u32) -> bool {
        let a = Span::new("t.td12", l1 % 500, c1 % 200, len1 % 200);
        let b = Span::new("t.td12", l2 % 500, c2 % 200, len2 % 200);
        let u = a.union(&b);
        u.line == a.line && u.column == a.column
    }
}
