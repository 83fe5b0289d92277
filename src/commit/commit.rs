use crate::commit::summary::CommitSummary;
use crate::repository::{Repository, RepositoryError};
use crate::source::Source;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

/// An applied change: the revision it started from, the one it produced, and
/// what the repository said about it.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    name: String,
    before: Source,
    after: Source,
    timestamp: u128,
    summary: CommitSummary,
}

impl Commit {
    pub fn new(name: impl Into<String>, before: Source, after: Source, timestamp: u128) -> Self {
        Self {
            name: name.into(),
            before,
            after,
            timestamp,
            summary: CommitSummary::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn before(&self) -> &Source {
        &self.before
    }

    pub fn after(&self) -> &Source {
        &self.after
    }

    /// Nanoseconds on the engine clock.
    pub fn timestamp(&self) -> u128 {
        self.timestamp
    }

    pub fn summary(&self) -> &CommitSummary {
        &self.summary
    }

    /// Copy of this commit carrying `summary` instead.
    pub fn with_summary(&self, summary: CommitSummary) -> Self {
        Self {
            summary,
            ..self.clone()
        }
    }
}

impl Ord for Commit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.before.contents().cmp(other.before.contents()))
            .then_with(|| self.after.contents().cmp(other.after.contents()))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.summary.cmp(&other.summary))
            .then_with(|| self.before.signature().cmp(&other.before.signature()))
    }
}

impl PartialOrd for Commit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Commit {}

/// A request to record `before -> after` with a repository.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub name: String,
    pub before: Source,
    pub after: Source,
}

impl CommitRequest {
    pub fn new(name: impl Into<String>, before: Source, after: Source) -> Self {
        Self {
            name: name.into(),
            before,
            after,
        }
    }

    /// Push to `repository` and return the commit with the resulting summary.
    ///
    /// Repository errors become a `Failure` summary; a rejection keeps the
    /// repository's reason as given. A request whose after equals its before
    /// is `Canceled` without contacting the repository.
    pub fn commit(self, repository: &mut dyn Repository, timestamp: u128) -> Commit {
        let commit = Commit::new(self.name, self.before, self.after, timestamp);
        if commit.before() == commit.after() {
            return commit.with_summary(CommitSummary::Canceled {
                reason: "no changes".to_string(),
            });
        }

        match repository.push(&commit) {
            Ok(summary) => {
                info!(
                    source = commit.before().name(),
                    name = commit.name(),
                    summary = %summary,
                    "commit pushed"
                );
                commit.with_summary(summary)
            }
            Err(err) => {
                warn!(source = commit.before().name(), error = %err, "commit failed");
                let reason = match err {
                    RepositoryError::Rejected { reason } => reason,
                    other => other.to_string(),
                };
                commit.with_summary(CommitSummary::Failure { reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    struct Offline;

    impl Repository for Offline {
        fn push(&mut self, _commit: &Commit) -> Result<CommitSummary, RepositoryError> {
            Err(RepositoryError::Rejected {
                reason: "remote unreachable".into(),
            })
        }

        fn pull(&self, id: &str) -> Result<Vec<Source>, RepositoryError> {
            Err(RepositoryError::NotFound { id: id.to_string() })
        }
    }

    #[test]
    fn ordering_falls_back_to_contents() {
        let s0 = Source::new("A.java", "a");
        let s1 = s0.revise("b");
        let s2 = s0.revise("c");

        let first = Commit::new("x", s0.clone(), s1.clone(), 5);
        let second = Commit::new("x", s0.clone(), s2, 5);
        let later = Commit::new("x", s1, s0, 6);
        assert!(first < second);
        assert!(second < later);
    }

    #[test]
    fn summary_replacement_keeps_commit_identity_fields() {
        let s0 = Source::new("A.java", "a");
        let commit = Commit::new("x", s0.clone(), s0.revise("b"), 1);
        let amended = commit.with_summary(CommitSummary::Canceled {
            reason: "later".into(),
        });
        assert_eq!(commit.summary(), &CommitSummary::Pending);
        assert_eq!(amended.after(), commit.after());
        assert_ne!(amended, commit);
    }

    #[test]
    fn successful_push() {
        let mut repository = InMemoryRepository::new("tester");
        let s0 = Source::new("A.java", "a");
        let commit = CommitRequest::new("edit", s0.clone(), s0.revise("b")).commit(&mut repository, 10);
        assert!(commit.summary().is_success());
    }

    #[test]
    fn failed_push_keeps_reason() {
        let s0 = Source::new("A.java", "a");
        let commit = CommitRequest::new("edit", s0.clone(), s0.revise("b")).commit(&mut Offline, 10);
        assert_eq!(
            commit.summary(),
            &CommitSummary::Failure {
                reason: "remote unreachable".into()
            }
        );
    }

    #[test]
    fn io_failure_is_described() {
        struct Unwritable;

        impl Repository for Unwritable {
            fn push(&mut self, _commit: &Commit) -> Result<CommitSummary, RepositoryError> {
                Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
            }

            fn pull(&self, id: &str) -> Result<Vec<Source>, RepositoryError> {
                Err(RepositoryError::NotFound { id: id.to_string() })
            }
        }

        let s0 = Source::new("A.java", "a");
        let commit = CommitRequest::new("edit", s0.clone(), s0.revise("b")).commit(&mut Unwritable, 10);
        assert_eq!(commit.summary().reason(), Some("repository I/O error: read-only"));
    }

    #[test]
    fn unchanged_source_is_canceled() {
        let s0 = Source::new("A.java", "a");
        let commit = CommitRequest::new("noop", s0.clone(), s0.clone()).commit(&mut Offline, 10);
        assert_eq!(commit.summary().reason(), Some("no changes"));
    }
}
