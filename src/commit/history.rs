//! Per-file commit timelines.
//!
//! Navigation matches revisions by [`Source`] equality (signature plus
//! contents) and searches from the most recent commit backwards, so when a
//! file returns to earlier text the latest occurrence wins.

use crate::commit::commit::Commit;
use crate::source::{Signature, Source};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("{source_name} is not part of its recorded history")]
    NotFound { source_name: String },

    #[error("no history for {source_name}; register it first")]
    Unregistered { source_name: String },

    #[error("commit for signature {found} does not belong to history {expected}")]
    SignatureMismatch {
        expected: Signature,
        found: Signature,
    },

    #[error("commit {name} does not sort after the last recorded commit")]
    OutOfOrder { name: String },
}

/// Ordered, duplicate-free commits of one logical file.
#[derive(Debug, Clone)]
pub struct CommitHistory {
    key: Signature,
    commits: Vec<Commit>,
}

impl CommitHistory {
    pub fn new(key: Signature) -> Self {
        Self {
            key,
            commits: Vec::new(),
        }
    }

    pub fn key(&self) -> Signature {
        self.key
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Commit> {
        self.commits.iter()
    }

    pub fn first(&self) -> Option<&Commit> {
        self.commits.first()
    }

    pub fn last(&self) -> Option<&Commit> {
        self.commits.last()
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.commits
            .iter()
            .any(|commit| commit.before() == source || commit.after() == source)
    }

    /// Append a commit. It must belong to this file and sort strictly after
    /// every commit already recorded.
    pub fn append(&mut self, commit: Commit) -> Result<(), HistoryError> {
        let found = commit.before().signature();
        if found != self.key {
            return Err(HistoryError::SignatureMismatch {
                expected: self.key,
                found,
            });
        }
        if let Some(last) = self.commits.last() {
            if commit <= *last {
                return Err(HistoryError::OutOfOrder {
                    name: commit.name().to_string(),
                });
            }
        }
        self.commits.push(commit);
        Ok(())
    }

    /// The revision following `current`, or `current` itself at the latest.
    pub fn advance(&self, current: &Source) -> Source {
        self.commits
            .iter()
            .rev()
            .find(|commit| commit.before() == current)
            .map(|commit| commit.after().clone())
            .unwrap_or_else(|| current.clone())
    }

    /// The revision preceding `current`, or `current` itself at the earliest.
    pub fn regress(&self, current: &Source) -> Source {
        self.commits
            .iter()
            .rev()
            .find(|commit| commit.after() == current)
            .map(|commit| commit.before().clone())
            .unwrap_or_else(|| current.clone())
    }

    /// Drop every commit after the point where `source` was produced.
    ///
    /// `source` may be the head, the after-revision of any commit, or the
    /// original revision (which empties the history). This cannot be undone.
    pub fn rewrite(&mut self, source: &Source) -> Result<(), HistoryError> {
        let keep = if let Some(index) = self
            .commits
            .iter()
            .rposition(|commit| commit.after() == source)
        {
            index + 1
        } else if self.first().is_some_and(|commit| commit.before() == source) {
            0
        } else {
            return Err(HistoryError::NotFound {
                source_name: source.name().to_string(),
            });
        };

        let dropped = self.commits.len() - keep;
        self.commits.truncate(keep);
        if dropped > 0 {
            warn!(source = source.name(), dropped, "history rewritten");
        }
        Ok(())
    }
}

/// Histories of every registered file, keyed by signature.
#[derive(Debug, Default)]
pub struct Timeline {
    histories: HashMap<Signature, CommitHistory>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty history for `source` unless one exists.
    pub fn register(&mut self, source: &Source) -> &CommitHistory {
        let key = source.signature();
        self.histories.entry(key).or_insert_with(|| {
            debug!(source = source.name(), signature = %key, "history created");
            CommitHistory::new(key)
        })
    }

    pub fn history(&self, signature: Signature) -> Option<&CommitHistory> {
        self.histories.get(&signature)
    }

    pub fn is_registered(&self, source: &Source) -> bool {
        self.histories.contains_key(&source.signature())
    }

    /// Append a commit to the history of its before-revision.
    pub fn record(&mut self, commit: Commit) -> Result<(), HistoryError> {
        let history = self
            .histories
            .get_mut(&commit.before().signature())
            .ok_or_else(|| HistoryError::Unregistered {
                source_name: commit.before().name().to_string(),
            })?;
        history.append(commit)
    }

    pub fn advance(&self, current: &Source) -> Source {
        match self.histories.get(&current.signature()) {
            Some(history) => history.advance(current),
            None => current.clone(),
        }
    }

    pub fn regress(&self, current: &Source) -> Source {
        match self.histories.get(&current.signature()) {
            Some(history) => history.regress(current),
            None => current.clone(),
        }
    }

    pub fn rewrite(&mut self, source: &Source) -> Result<(), HistoryError> {
        match self.histories.get_mut(&source.signature()) {
            Some(history) => history.rewrite(source),
            None => Err(HistoryError::NotFound {
                source_name: source.name().to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
