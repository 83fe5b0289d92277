//! Relations between two source intervals.
//!
//! With `A = [As, Ae]` and `B = [Bs, Be]` (ends are the last byte), the
//! exclusive end of `A` is `Ae + 1`. It is only ever formed here.

use super::{Location, Position};
use serde::Serialize;

fn bounds(location: &Location) -> (i64, i64) {
    (location.start.offset, location.end.offset)
}

/// Identical start and end.
pub fn both_same(a: &Location, b: &Location) -> bool {
    bounds(a) == bounds(b)
}

/// `As <= Bs` and `Be <= Ae + 1`.
pub fn covers(a: &Location, b: &Location) -> bool {
    let (a_start, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    a_start <= b_start && b_end <= a_end + 1
}

/// `As < Bs` and `Be < Ae`, no boundary touch.
pub fn inside_strict(a: &Location, b: &Location) -> bool {
    let (a_start, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    a_start < b_start && b_end < a_end
}

pub fn covered_by(a: &Location, b: &Location) -> bool {
    covers(b, a)
}

/// `B` ends before `A` starts.
fn before(a: &Location, b: &Location) -> bool {
    let (a_start, _) = bounds(a);
    let (_, b_end) = bounds(b);
    b_end < a_start
}

/// `B` starts past the exclusive end of `A`.
fn after(a: &Location, b: &Location) -> bool {
    let (_, a_end) = bounds(a);
    let (b_start, _) = bounds(b);
    a_end + 1 < b_start
}

/// No overlap in either direction.
pub fn lies_outside(a: &Location, b: &Location) -> bool {
    before(a, b) || after(a, b)
}

/// Partial overlap: neither disjoint nor nested either way.
pub fn intersects(a: &Location, b: &Location) -> bool {
    !before(a, b) && !covers(a, b) && !covered_by(a, b) && !after(a, b)
}

/// `B` starts before the exclusive end of `A`, and that end falls before `B`
/// ends: an overlap that terminates inside `B`.
pub fn ends_in(a: &Location, b: &Location) -> bool {
    let (_, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    b_start < a_end + 1 && a_end + 1 < b_end
}

/// `B` starts strictly after `A` does.
pub fn starts_after(a: &Location, b: &Location) -> bool {
    a.start.offset < b.start.offset
}

pub fn begins(a: &Location, position: &Position) -> bool {
    a.start.offset == position.offset
}

pub fn ends(a: &Location, position: &Position) -> bool {
    a.end.offset == position.offset
}

/// The single covering relation that holds between two locations.
///
/// Checked in declaration order, so an identical pair is `BothSame` even though
/// it also covers in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relation {
    BothSame,
    Covers,
    CoveredBy,
    LiesOutside,
    Intersects,
}

impl Relation {
    pub fn between(a: &Location, b: &Location) -> Relation {
        if both_same(a, b) {
            Relation::BothSame
        } else if covers(a, b) {
            Relation::Covers
        } else if covered_by(a, b) {
            Relation::CoveredBy
        } else if lies_outside(a, b) {
            Relation::LiesOutside
        } else {
            Relation::Intersects
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn span(start: i64, end: i64) -> Location {
        let source = Source::new("T.java", "");
        Location::new(
            source.source_ref(),
            Position::new(1, start + 1, start),
            Position::new(1, end + 1, end),
        )
    }

    /// Offsets an interval occupies, optionally extended by its exclusive end.
    fn offsets(location: &Location, with_exclusive_end: bool) -> BTreeSet<i64> {
        let extra = i64::from(with_exclusive_end);
        (location.start.offset..=location.end.offset + extra).collect()
    }

    fn reference(a: &Location, b: &Location) -> Relation {
        let a_plain = offsets(a, false);
        let b_plain = offsets(b, false);
        let a_extended = offsets(a, true);
        let b_extended = offsets(b, true);

        if a_plain.first() == b_plain.first() && a_plain.last() == b_plain.last() {
            Relation::BothSame
        } else if b_plain.is_subset(&a_extended) {
            Relation::Covers
        } else if a_plain.is_subset(&b_extended) {
            Relation::CoveredBy
        } else if b_plain.is_disjoint(&a_extended) {
            Relation::LiesOutside
        } else {
            Relation::Intersects
        }
    }

    #[test]
    fn covers_tolerates_exclusive_end() {
        // "foo" at 0..=2 and a selection whose end names the exclusive end.
        assert!(covers(&span(0, 2), &span(0, 3)));
        assert!(!covers(&span(0, 2), &span(0, 4)));
        assert!(covers(&span(0, 10), &span(3, 5)));
        assert!(!covers(&span(3, 5), &span(0, 10)));
    }

    #[test]
    fn inside_strict_rejects_boundary_touch() {
        assert!(inside_strict(&span(0, 10), &span(1, 9)));
        assert!(!inside_strict(&span(0, 10), &span(0, 9)));
        assert!(!inside_strict(&span(0, 10), &span(1, 10)));
    }

    #[test]
    fn outside_and_adjacent() {
        assert!(lies_outside(&span(5, 8), &span(0, 3)));
        assert!(lies_outside(&span(0, 3), &span(5, 8)));
        // Starting right at the exclusive end still counts as touching.
        assert!(!lies_outside(&span(0, 3), &span(4, 8)));
    }

    #[test]
    fn intersects_is_partial_overlap() {
        assert!(intersects(&span(0, 5), &span(3, 9)));
        assert!(intersects(&span(3, 9), &span(0, 5)));
        assert!(!intersects(&span(0, 9), &span(3, 5)));
        assert!(!intersects(&span(3, 5), &span(0, 9)));
        assert!(!intersects(&span(0, 2), &span(6, 9)));
    }

    #[test]
    fn ends_in_overlap() {
        assert!(ends_in(&span(0, 4), &span(2, 9)));
        assert!(!ends_in(&span(0, 9), &span(2, 5)));
        assert!(!ends_in(&span(0, 1), &span(4, 9)));
    }

    #[test]
    fn boundaries() {
        let location = span(4, 7);
        assert!(begins(&location, &Position::new(1, 5, 4)));
        assert!(!begins(&location, &Position::new(1, 6, 5)));
        assert!(ends(&location, &Position::new(1, 8, 7)));
        assert!(starts_after(&span(0, 9), &location));
        assert!(!starts_after(&location, &span(4, 5)));
    }

    #[test]
    fn relation_precedence() {
        assert_eq!(Relation::between(&span(2, 4), &span(2, 4)), Relation::BothSame);
        assert_eq!(Relation::between(&span(0, 9), &span(2, 4)), Relation::Covers);
        assert_eq!(Relation::between(&span(2, 4), &span(0, 9)), Relation::CoveredBy);
        assert_eq!(Relation::between(&span(0, 1), &span(5, 9)), Relation::LiesOutside);
        assert_eq!(Relation::between(&span(0, 5), &span(3, 9)), Relation::Intersects);
    }

    proptest! {
        #[test]
        fn relation_matches_brute_force(
            a_start in 0i64..40,
            a_len in 0i64..20,
            b_start in 0i64..40,
            b_len in 0i64..20,
        ) {
            let a = span(a_start, a_start + a_len);
            let b = span(b_start, b_start + b_len);
            prop_assert_eq!(Relation::between(&a, &b), reference(&a, &b));
        }

        #[test]
        fn intersects_excludes_every_other_relation(
            a_start in 0i64..40,
            a_len in 0i64..20,
            b_start in 0i64..40,
            b_len in 0i64..20,
        ) {
            let a = span(a_start, a_start + a_len);
            let b = span(b_start, b_start + b_len);
            if intersects(&a, &b) {
                prop_assert!(!lies_outside(&a, &b));
                prop_assert!(!covers(&a, &b));
                prop_assert!(!covered_by(&a, &b));
                prop_assert!(!both_same(&a, &b));
            }
        }
    }
}
