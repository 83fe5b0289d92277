use crate::change::cause::Cause;
use crate::tree::SyntaxTree;

/// Scans a parsed revision and reports issues as causes.
///
/// Detectors keep no state between scans beyond their own configuration;
/// the engine re-runs them for every new revision.
pub trait IssueDetector: Send + Sync {
    fn name(&self) -> &str;

    fn scan(&self, tree: &SyntaxTree) -> Vec<Cause>;
}
