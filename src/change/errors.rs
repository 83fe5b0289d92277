use crate::diff::DiffError;
use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChangeError {
    #[error("no suitable changer for {cause}")]
    NoSuitableChanger { cause: String },

    #[error("change is invalid: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },

    #[error("change for {source_name} was built against a different revision")]
    StaleTree { source_name: String },

    #[error("{changer} could not rewrite: {reason}")]
    Rewrite { changer: String, reason: String },

    #[error("edit failed: {0}")]
    Edit(#[from] EditError),

    #[error("reconciliation failed: {0}")]
    Diff(#[from] DiffError),
}
