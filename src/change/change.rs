use crate::change::cause::Cause;
use crate::change::changer::{Changer, Parameters, Rewrite};
use crate::change::errors::ChangeError;
use crate::diff::Reconciliation;
use crate::edit::apply_edits;
use crate::source::Source;
use crate::tree::SyntaxTree;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// One source's before and after revisions within a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub before: Source,
    pub after: Source,
}

impl Delta {
    /// The source this delta touches.
    pub fn source(&self) -> &Source {
        &self.before
    }

    pub fn before_text(&self) -> &str {
        self.before.contents()
    }

    pub fn after_text(&self) -> &str {
        self.after.contents()
    }

    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeState {
    Created,
    Validated,
    Rejected,
    Performed,
    Committed,
    Failed,
}

/// A pending transformation derived from one cause.
pub struct Change {
    cause: Cause,
    params: Parameters,
    changer: Arc<dyn Changer>,
    deltas: Vec<Delta>,
    errors: Vec<String>,
    state: ChangeState,
}

impl Change {
    pub(crate) fn new(cause: Cause, params: Parameters, changer: Arc<dyn Changer>) -> Self {
        Self {
            cause,
            params,
            changer,
            deltas: Vec::new(),
            errors: Vec::new(),
            state: ChangeState::Created,
        }
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn changer_name(&self) -> &str {
        self.changer.name()
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn state(&self) -> ChangeState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a validation failure. A rejected change is never performed.
    pub fn reject(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.state = ChangeState::Rejected;
    }

    /// Ask the changer whether this change can go ahead.
    pub(crate) fn validate(&mut self, tree: &SyntaxTree) {
        if self.state != ChangeState::Created {
            return;
        }
        let problems = self.changer.check(&self.cause, tree, &self.params);
        if problems.is_empty() {
            self.state = ChangeState::Validated;
        } else {
            for problem in problems {
                self.reject(problem);
            }
        }
    }

    /// Produce the deltas. `tree` must be the parse of the cause's revision.
    pub fn perform(&mut self, tree: &SyntaxTree) -> Result<&[Delta], ChangeError> {
        match self.state {
            ChangeState::Performed | ChangeState::Committed => return Ok(&self.deltas),
            _ if !self.is_valid() => {
                return Err(ChangeError::Invalid {
                    errors: self.errors.clone(),
                })
            }
            _ => {}
        }

        match self.compute(tree) {
            Ok(delta) => {
                self.deltas.push(delta);
                self.state = ChangeState::Performed;
                Ok(&self.deltas)
            }
            Err(err) => {
                warn!(changer = self.changer.name(), cause = %self.cause, error = %err, "change failed");
                self.errors.push(err.to_string());
                self.state = ChangeState::Failed;
                Err(err)
            }
        }
    }

    fn compute(&self, tree: &SyntaxTree) -> Result<Delta, ChangeError> {
        let before = self.cause.source();
        if tree.source() != before {
            return Err(ChangeError::StaleTree {
                source_name: before.name().to_string(),
            });
        }

        let text = match self.changer.rewrite(&self.cause, tree, &self.params)? {
            Rewrite::Edits(edits) => apply_edits(before.contents(), &edits)?,
            Rewrite::Text(text) => text,
        };
        let after = Reconciliation::new(before, &before.revise(text)).resolve()?;

        Ok(Delta {
            before: before.clone(),
            after,
        })
    }

    pub(crate) fn mark_committed(&mut self) {
        self.state = ChangeState::Committed;
    }

    pub(crate) fn mark_failed(&mut self, reason: impl Into<String>) {
        self.errors.push(reason.into());
        self.state = ChangeState::Failed;
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("cause", &self.cause.to_string())
            .field("changer", &self.changer.name())
            .field("deltas", &self.deltas.len())
            .field("errors", &self.errors)
            .field("state", &self.state)
            .finish()
    }
}
