use crate::diff::errors::DiffError;
use crate::source::Source;
use similar::{capture_diff_slices, Algorithm, DiffTag};
use std::ops::Range;

/// Lines of a text, each keeping its terminator so joining them reproduces
/// the text exactly.
pub(crate) fn lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// One contiguous replacement: the original lines starting at
/// `original_start` are replaced by `revised`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub original_start: usize,
    pub original: Vec<String>,
    pub revised: Vec<String>,
}

impl Hunk {
    /// Original line range this hunk replaces.
    pub fn original_range(&self) -> Range<usize> {
        self.original_start..self.original_start + self.original.len()
    }

    pub fn is_insertion(&self) -> bool {
        self.original.is_empty()
    }
}

/// Edit script turning one text into another, as ordered hunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    hunks: Vec<Hunk>,
}

/// Line diff of two texts.
pub fn diff(original: &str, revised: &str) -> Patch {
    let old_lines = lines(original);
    let new_lines = lines(revised);
    let ops = capture_diff_slices(Algorithm::Lcs, &old_lines, &new_lines);

    let mut hunks: Vec<Hunk> = Vec::new();
    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            continue;
        }
        let original: Vec<String> = old_lines[old_range.clone()]
            .iter()
            .map(|line| line.to_string())
            .collect();
        let revised: Vec<String> = new_lines[new_range]
            .iter()
            .map(|line| line.to_string())
            .collect();

        // Adjacent delete/insert pairs become one hunk.
        if let Some(last) = hunks.last_mut() {
            if last.original_range().end == old_range.start {
                last.original.extend(original);
                last.revised.extend(revised);
                continue;
            }
        }
        hunks.push(Hunk {
            original_start: old_range.start,
            original,
            revised,
        });
    }
    Patch { hunks }
}

impl Patch {
    pub fn from_hunks(mut hunks: Vec<Hunk>) -> Self {
        hunks.sort_by_key(|hunk| (hunk.original_start, hunk.original.len()));
        Self { hunks }
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Apply to `original`, checking that every hunk finds the lines it
    /// expects. Nothing fuzzy: any mismatch fails the whole patch.
    pub fn apply(&self, original: &str) -> Result<String, DiffError> {
        let mut lines: Vec<&str> = lines(original);
        let len = lines.len();

        for hunk in &self.hunks {
            let range = hunk.original_range();
            if range.end > len {
                return Err(DiffError::OutOfRange {
                    line: hunk.original_start + 1,
                    len,
                });
            }
            for (offset, expected) in hunk.original.iter().enumerate() {
                let found = lines[range.start + offset];
                if found != expected {
                    return Err(DiffError::Mismatch {
                        line: range.start + offset + 1,
                        expected: expected.clone(),
                        found: found.to_string(),
                    });
                }
            }
        }

        // Bottom-up so earlier line numbers stay valid.
        for hunk in self.hunks.iter().rev() {
            lines.splice(
                hunk.original_range(),
                hunk.revised.iter().map(String::as_str),
            );
        }
        Ok(lines.concat())
    }
}

/// A diff between two revisions of one file, checked on resolution.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    original: Source,
    revised: Source,
    patch: Patch,
}

impl Reconciliation {
    pub fn new(original: &Source, revised: &Source) -> Self {
        Self {
            original: original.clone(),
            revised: revised.clone(),
            patch: diff(original.contents(), revised.contents()),
        }
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Apply the patch to the original and return the resulting revision.
    /// Fails unless the result is exactly the revised text.
    pub fn resolve(&self) -> Result<Source, DiffError> {
        let patched = self.patch.apply(self.original.contents())?;
        if patched != self.revised.contents() {
            return Err(DiffError::Unreconciled {
                source_name: self.original.name().to_string(),
            });
        }
        Ok(self.original.revise(patched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_texts_produce_empty_patch() {
        assert!(diff("a\nb\n", "a\nb\n").is_empty());
    }

    #[test]
    fn replacement_is_a_single_hunk() {
        let patch = diff("a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(patch.hunks().len(), 1);
        let hunk = &patch.hunks()[0];
        assert_eq!(hunk.original_start, 1);
        assert_eq!(hunk.original, vec!["b\n"]);
        assert_eq!(hunk.revised, vec!["B\n"]);
    }

    #[test]
    fn missing_trailing_newline_is_a_difference() {
        let patch = diff("a\nb\n", "a\nb");
        assert_eq!(patch.apply("a\nb\n").unwrap(), "a\nb");
    }

    #[test]
    fn apply_rejects_drifted_original() {
        let patch = diff("a\nb\nc\n", "a\nB\nc\n");
        let err = patch.apply("a\nx\nc\n").unwrap_err();
        assert_eq!(
            err,
            DiffError::Mismatch {
                line: 2,
                expected: "b\n".into(),
                found: "x\n".into(),
            }
        );
    }

    #[test]
    fn apply_rejects_truncated_original() {
        let patch = diff("a\nb\nc\n", "a\nb\n");
        assert!(matches!(patch.apply("a\n"), Err(DiffError::OutOfRange { .. })));
    }

    #[test]
    fn reconciliation_yields_revision_of_original() {
        let original = Source::new("A.java", "class A {\n}\n");
        let revised = original.revise("class A {\n  int x;\n}\n");
        let resolved = Reconciliation::new(&original, &revised).resolve().unwrap();

        assert_eq!(resolved, revised);
        assert_eq!(resolved.signature(), original.signature());
    }

    fn text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["a\n", "b\n", "c\n", "\n", "d"]), 0..12)
            .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn diff_round_trip(original in text(), revised in text()) {
            let patch = diff(&original, &revised);
            prop_assert_eq!(patch.apply(&original).unwrap(), revised);
        }
    }
}
