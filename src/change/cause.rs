use crate::location::Location;
use crate::source::Source;
use crate::tree::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Short label of a cause: what is wrong (or wanted) and why.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CauseName {
    pub what: String,
    pub why: String,
}

impl CauseName {
    pub fn new(what: impl Into<String>, why: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: why.into(),
        }
    }
}

impl fmt::Display for CauseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.why.is_empty() {
            write!(f, "{}", self.what)
        } else {
            write!(f, "{} ({})", self.what, self.why)
        }
    }
}

/// A problem reported by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Name of the detector that raised it.
    pub detector: String,
    pub name: CauseName,
    pub source: Source,
    pub affected: Vec<NodeId>,
    pub description: String,
    /// Values captured by the detector, available to changers.
    pub bindings: BTreeMap<String, String>,
}

/// A change the user asked for explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditIntent {
    pub name: CauseName,
    pub source: Source,
    /// Selected text range the edit applies to, when the intent has one.
    pub selection: Option<Location>,
    pub affected: Vec<NodeId>,
    pub description: String,
}

/// Why a source must change.
///
/// `affected` ids point into the tree of `source`'s revision; they are
/// meaningless against any other revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cause {
    Issue(Issue),
    Edit(EditIntent),
}

impl Cause {
    pub fn edit(
        name: CauseName,
        source: &Source,
        selection: Option<Location>,
        description: impl Into<String>,
    ) -> Self {
        Cause::Edit(EditIntent {
            name,
            source: source.clone(),
            selection,
            affected: Vec::new(),
            description: description.into(),
        })
    }

    pub fn name(&self) -> &CauseName {
        match self {
            Cause::Issue(issue) => &issue.name,
            Cause::Edit(intent) => &intent.name,
        }
    }

    pub fn source(&self) -> &Source {
        match self {
            Cause::Issue(issue) => &issue.source,
            Cause::Edit(intent) => &intent.source,
        }
    }

    pub fn affected(&self) -> &[NodeId] {
        match self {
            Cause::Issue(issue) => &issue.affected,
            Cause::Edit(intent) => &intent.affected,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Cause::Issue(issue) => &issue.description,
            Cause::Edit(intent) => &intent.description,
        }
    }

    /// The detector that raised this cause; `None` for user intents.
    pub fn detector(&self) -> Option<&str> {
        match self {
            Cause::Issue(issue) => Some(&issue.detector),
            Cause::Edit(_) => None,
        }
    }

    pub fn selection(&self) -> Option<&Location> {
        match self {
            Cause::Issue(_) => None,
            Cause::Edit(intent) => intent.selection.as_ref(),
        }
    }

    pub fn bindings(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Cause::Issue(issue) => Some(&issue.bindings),
            Cause::Edit(_) => None,
        }
    }

    /// Attach affected node ids.
    pub fn with_affected(mut self, affected: Vec<NodeId>) -> Self {
        match &mut self {
            Cause::Issue(issue) => issue.affected = affected,
            Cause::Edit(intent) => intent.affected = affected,
        }
        self
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detector() {
            Some(detector) => write!(f, "[{detector}] {}", self.name()),
            None => write!(f, "[edit] {}", self.name()),
        }
    }
}
