//! Commits and the per-file timeline they form.

pub mod commit;
pub mod history;
pub mod summary;

pub use commit::{Commit, CommitRequest};
pub use history::{CommitHistory, HistoryError, Timeline};
pub use summary::CommitSummary;
