use crate::repository::guard::SafetyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("repository rejected the commit: {reason}")]
    Rejected { reason: String },

    #[error("no revisions recorded for {id}")]
    NotFound { id: String },

    #[error("{0}")]
    Safety(#[from] SafetyError),

    #[error("repository I/O error: {0}")]
    Io(#[from] std::io::Error),
}
