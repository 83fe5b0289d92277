use crate::source::Source;
use crate::tree::arena::{SyntaxErrorSpan, SyntaxTree};
use crate::tree::errors::TreeError;
use crate::tree::parser::Parser;

/// Parse `after` (incrementally from `before`) and refuse it if it carries
/// syntax errors the before-revision did not have.
///
/// Returns the new tree so callers can keep it instead of parsing again.
pub fn validate_rewrite(
    parser: &mut dyn Parser,
    before: &SyntaxTree,
    after: &Source,
) -> Result<SyntaxTree, TreeError> {
    let tree = parser.reparse(before, after)?;

    // Comparing by position is imperfect once text shifts, but an error that
    // survives at the same span was not introduced by this rewrite.
    let introduced: Vec<&SyntaxErrorSpan> = tree
        .errors()
        .iter()
        .filter(|error| !before.errors().contains(error))
        .collect();

    match introduced.first() {
        None => Ok(tree),
        Some(first) => Err(TreeError::SyntaxErrorIntroduced {
            count: introduced.len(),
            byte_start: first.byte_start,
            byte_end: first.byte_end,
        }),
    }
}
