use crate::commit::{Commit, CommitSummary};
use crate::repository::errors::RepositoryError;
use crate::repository::Repository;
use crate::source::Source;
use std::collections::HashMap;
use tracing::debug;

/// Process-local revision log. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    user: String,
    revisions: HashMap<String, Vec<Source>>,
    pushed: u64,
}

impl InMemoryRepository {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    /// Number of commits accepted so far.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}

impl Repository for InMemoryRepository {
    fn push(&mut self, commit: &Commit) -> Result<CommitSummary, RepositoryError> {
        let id = commit.before().repository_id().to_string();
        let log = self.revisions.entry(id.clone()).or_default();
        if log.last() != Some(commit.before()) {
            log.push(commit.before().clone());
        }
        log.push(commit.after().clone());

        self.pushed += 1;
        debug!(id = %id, revisions = log.len(), "revision recorded");
        Ok(CommitSummary::Success {
            id: format!("mem-{}", self.pushed),
            user: self.user.clone(),
            timestamp: commit.timestamp(),
            url: None,
            message: commit.name().to_string(),
        })
    }

    fn pull(&self, id: &str) -> Result<Vec<Source>, RepositoryError> {
        self.revisions
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }
}
