use crate::diff::errors::DiffError;
use crate::diff::patch::{diff, Hunk, Patch};
use crate::source::Source;
use tracing::debug;

fn conflicts(a: &Hunk, b: &Hunk) -> bool {
    let (ra, rb) = (a.original_range(), b.original_range());
    match (a.is_insertion(), b.is_insertion()) {
        (false, false) => ra.start < rb.end && rb.start < ra.end,
        (true, false) => rb.start <= ra.start && ra.start < rb.end,
        (false, true) => ra.start <= rb.start && rb.start < ra.end,
        (true, true) => ra.start == rb.start,
    }
}

/// Fold independently edited variants of `base` into one revision.
///
/// Each variant is diffed against the base and its hunks are accepted in
/// turn. A hunk that touches lines an earlier variant already changed is a
/// conflict, unless both made the identical change.
pub fn merge(base: &Source, variants: &[Source]) -> Result<Source, DiffError> {
    let mut accepted: Vec<Hunk> = Vec::new();

    for (index, variant) in variants.iter().enumerate() {
        if variant.signature() != base.signature() {
            return Err(DiffError::ForeignVariant { variant: index });
        }
        let patch = diff(base.contents(), variant.contents());
        for hunk in patch.hunks() {
            if accepted.contains(hunk) {
                continue;
            }
            if accepted.iter().any(|other| conflicts(other, hunk)) {
                return Err(DiffError::Conflict {
                    variant: index,
                    line: hunk.original_start + 1,
                });
            }
            accepted.push(hunk.clone());
        }
        debug!(
            source = base.name(),
            variant = index,
            hunks = accepted.len(),
            "merged variant"
        );
    }

    let merged = Patch::from_hunks(accepted).apply(base.contents())?;
    Ok(base.revise(merged))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "a\nb\nc\nd\ne\n";

    #[test]
    fn disjoint_variants_combine() {
        let base = Source::new("A.java", BASE);
        let first = base.revise("A\nb\nc\nd\ne\n");
        let second = base.revise("a\nb\nc\nd\nE\nf\n");

        let merged = merge(&base, &[first, second]).unwrap();
        assert_eq!(merged.contents(), "A\nb\nc\nd\nE\nf\n");
        assert_eq!(merged.signature(), base.signature());
    }

    #[test]
    fn identical_changes_are_not_conflicts() {
        let base = Source::new("A.java", BASE);
        let variant = base.revise("a\nB\nc\nd\ne\n");

        let merged = merge(&base, &[variant.clone(), variant]).unwrap();
        assert_eq!(merged.contents(), "a\nB\nc\nd\ne\n");
    }

    #[test]
    fn overlapping_changes_conflict() {
        let base = Source::new("A.java", BASE);
        let first = base.revise("a\nB\nc\nd\ne\n");
        let second = base.revise("a\nX\nc\nd\ne\n");

        assert_eq!(
            merge(&base, &[first, second]),
            Err(DiffError::Conflict { variant: 1, line: 2 })
        );
    }

    #[test]
    fn inserts_at_same_line_conflict() {
        let base = Source::new("A.java", BASE);
        let first = base.revise("a\nx\nb\nc\nd\ne\n");
        let second = base.revise("a\ny\nb\nc\nd\ne\n");

        assert!(matches!(
            merge(&base, &[first, second]),
            Err(DiffError::Conflict { .. })
        ));
    }

    #[test]
    fn variant_of_other_file_is_rejected() {
        let base = Source::new("A.java", BASE);
        let other = Source::new("B.java", BASE);
        assert_eq!(
            merge(&base, &[other]),
            Err(DiffError::ForeignVariant { variant: 0 })
        );
    }

    #[test]
    fn no_variants_returns_base_text() {
        let base = Source::new("A.java", BASE);
        assert_eq!(merge(&base, &[]).unwrap(), base);
    }
}
