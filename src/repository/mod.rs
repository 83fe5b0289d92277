//! Where commits go.
//!
//! The engine only looks at the [`CommitSummary`] a push returns; transport
//! and storage are the backend's business.

pub mod errors;
pub mod guard;
pub mod local;
pub mod memory;

pub use errors::RepositoryError;
pub use guard::{SafetyError, WorkspaceGuard};
pub use local::LocalRepository;
pub use memory::InMemoryRepository;

use crate::commit::{Commit, CommitSummary};
use crate::source::Source;

pub trait Repository: Send {
    /// Record a commit. An error means nothing was recorded.
    fn push(&mut self, commit: &Commit) -> Result<CommitSummary, RepositoryError>;

    /// Historical revisions of a document, oldest first.
    fn pull(&self, id: &str) -> Result<Vec<Source>, RepositoryError>;
}
