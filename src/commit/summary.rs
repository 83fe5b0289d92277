use serde::Serialize;
use std::fmt;

/// Outcome of pushing a commit. Summaries are replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitSummary {
    Pending,
    Success {
        id: String,
        user: String,
        /// Nanoseconds on the engine clock.
        timestamp: u128,
        url: Option<String>,
        message: String,
    },
    Failure {
        reason: String,
    },
    Canceled {
        reason: String,
    },
}

impl CommitSummary {
    pub fn is_success(&self) -> bool {
        matches!(self, CommitSummary::Success { .. })
    }

    /// Failure or cancellation reason, verbatim.
    pub fn reason(&self) -> Option<&str> {
        match self {
            CommitSummary::Failure { reason } | CommitSummary::Canceled { reason } => Some(reason),
            _ => None,
        }
    }

    /// Same summary with a new message. Only successful summaries carry one.
    pub fn amend(&self, message: impl Into<String>) -> Self {
        match self {
            CommitSummary::Success {
                id,
                user,
                timestamp,
                url,
                ..
            } => CommitSummary::Success {
                id: id.clone(),
                user: user.clone(),
                timestamp: *timestamp,
                url: url.clone(),
                message: message.into(),
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitSummary::Pending => write!(f, "pending"),
            CommitSummary::Success { id, user, message, .. } => {
                write!(f, "committed {id} by {user}: {message}")
            }
            CommitSummary::Failure { reason } => write!(f, "failed: {reason}"),
            CommitSummary::Canceled { reason } => write!(f, "canceled: {reason}"),
        }
    }
}
