use crate::change::cause::Cause;
use crate::change::errors::ChangeError;
use crate::edit::TextEdit;
use crate::tree::SyntaxTree;
use std::collections::BTreeMap;

/// Free-form arguments for a changer (a new name, a target position...).
pub type Parameters = BTreeMap<String, String>;

/// What a changer produces for one cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Byte-span edits against the cause's revision.
    Edits(Vec<TextEdit>),
    /// The complete after-text.
    Text(String),
}

/// A strategy that turns a cause into a rewrite of its source.
///
/// Changers are consulted in registration order; the first whose
/// [`Changer::can_handle`] accepts a cause owns it.
pub trait Changer: Send + Sync {
    fn name(&self) -> &str;

    fn can_handle(&self, cause: &Cause) -> bool;

    /// Reasons this cause cannot be changed with these parameters. An empty
    /// list means the change may be performed.
    fn check(&self, cause: &Cause, tree: &SyntaxTree, params: &Parameters) -> Vec<String> {
        let _ = (cause, tree, params);
        Vec::new()
    }

    fn rewrite(
        &self,
        cause: &Cause,
        tree: &SyntaxTree,
        params: &Parameters,
    ) -> Result<Rewrite, ChangeError>;
}
