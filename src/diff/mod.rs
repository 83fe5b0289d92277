//! Line-based diff and reconciliation.
//!
//! Lines keep their terminators, so a missing trailing newline is a change
//! like any other and `diff` followed by `apply` reproduces the revised text
//! byte for byte.

pub mod errors;
pub mod merge;
pub mod patch;

pub use errors::DiffError;
pub use merge::merge;
pub use patch::{diff, Hunk, Patch, Reconciliation};

use similar::TextDiff;

/// Unified diff of two texts, for display.
pub fn unified(original: &str, revised: &str, name: &str) -> String {
    TextDiff::from_lines(original, revised)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_has_headers_and_changes() {
        let rendered = unified("a\nb\n", "a\nc\n", "A.java");
        assert!(rendered.contains("--- a/A.java"));
        assert!(rendered.contains("+++ b/A.java"));
        assert!(rendered.contains("-b"));
        assert!(rendered.contains("+c"));
    }

    #[test]
    fn unified_is_empty_for_identical_texts() {
        assert!(unified("a\n", "a\n", "A.java").is_empty());
    }
}
