//! Source positions, intervals and the relations between them.
//!
//! A [`Location`] stores its end as the offset of the last byte it spans. Every
//! comparison that needs the exclusive end adds one at the comparison site in
//! [`algebra`]. Outside it, only [`Location::byte_range`] forms that end.

pub mod algebra;
pub mod selection;

pub use algebra::Relation;
pub use selection::{ForeignLocation, SourceSelection};

use crate::source::SourceRef;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A point in a source text. `-1` in any field means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: i64,
    pub column: i64,
    pub offset: i64,
}

impl Position {
    pub const UNKNOWN: Position = Position {
        line: -1,
        column: -1,
        offset: -1,
    };

    pub const fn new(line: i64, column: i64, offset: i64) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn is_known(&self) -> bool {
        self.offset >= 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An interval `[start, end]` within one source, `end` being the last byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub source: SourceRef,
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(source: SourceRef, start: Position, end: Position) -> Self {
        Self { source, start, end }
    }

    /// A zero-width location at `position`.
    pub fn point(source: SourceRef, position: Position) -> Self {
        Self::new(source, position, position)
    }

    /// True for a zero-width location and equally for a one-byte one: with
    /// the end stored as the last byte, `location(4..4)` and `location(4..5)`
    /// are the same value.
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    /// The location spanning from the start of `self` to the end of `other`.
    pub fn through(&self, other: &Location) -> Location {
        Location::new(self.source.clone(), self.start, other.end)
    }

    /// Exclusive byte range, for slicing the source text.
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.start.offset.max(0) as usize;
        let end = (self.end.offset + 1).max(self.start.offset.max(0)) as usize;
        start..end
    }

    pub fn both_same(&self, other: &Location) -> bool {
        algebra::both_same(self, other)
    }

    pub fn covers(&self, other: &Location) -> bool {
        algebra::covers(self, other)
    }

    pub fn covered_by(&self, other: &Location) -> bool {
        algebra::covered_by(self, other)
    }

    pub fn lies_outside(&self, other: &Location) -> bool {
        algebra::lies_outside(self, other)
    }

    pub fn intersects(&self, other: &Location) -> bool {
        algebra::intersects(self, other)
    }

    pub fn relation_to(&self, other: &Location) -> Relation {
        Relation::between(self, other)
    }
}

impl Ord for Location {
    /// Primary order is `(start.line, end.line)`; offsets and the source break
    /// ties so the order stays total.
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .line
            .cmp(&other.start.line)
            .then(self.end.line.cmp(&other.end.line))
            .then(self.start.offset.cmp(&other.start.offset))
            .then(self.end.offset.cmp(&other.end.offset))
            .then(self.start.column.cmp(&other.start.column))
            .then(self.end.column.cmp(&other.end.column))
            .then_with(|| self.source.cmp(&other.source))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.source.name, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    #[test]
    fn ordering_uses_lines_first() {
        let source = Source::new("A.java", "aaaa\nbbbb\ncccc\n");
        let second_line = source.location(5..9);
        let spanning = source.location(2..12);
        let first_line = source.location(0..2);

        let mut all = vec![second_line.clone(), spanning.clone(), first_line.clone()];
        all.sort();
        assert_eq!(all, vec![first_line, spanning, second_line]);
    }

    #[test]
    fn byte_range_round_trips() {
        let source = Source::new("A.java", "int value = 1;");
        let location = source.location(4..9);
        assert_eq!(&source.contents()[location.byte_range()], "value");
    }

    #[test]
    fn unknown_position() {
        assert!(!Position::UNKNOWN.is_known());
        assert!(Position::new(1, 1, 0).is_known());
    }
}
