//! Multi-node resolution: the run of sibling statements a selection covers,
//! and whether that run is something a refactoring may operate on.
//!
//! Rejections are values, not errors. A caller that gets an invalid
//! [`StatementSelection`] must not build a change from it.

use crate::location::{algebra, Location};
use crate::tree::{NodeId, NodeKind, SyntaxTree, Walk};
use serde::Serialize;
use std::fmt;

/// Why a selection cannot be treated as a run of whole statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionRejection {
    /// No node lies entirely inside the selection.
    Empty,
    /// The selection cuts through a node at the level of the selected run.
    Straddles,
    /// The run starts with an array initializer.
    ArrayInitializer,
    /// The run spans a loop's header and its body without taking the loop.
    LoopBoundary,
    /// The run contains a switch case label.
    CaseLabel,
    /// The run is the body of a synchronized block without the block.
    MonitorBody,
    /// The run is part of a try construct (body, catch, finally) without the
    /// whole statement.
    TryBoundary,
}

impl fmt::Display for SelectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            SelectionRejection::Empty => "selection does not contain a whole node",
            SelectionRejection::Straddles => "selection cuts through a node",
            SelectionRejection::ArrayInitializer => "selection starts with an array initializer",
            SelectionRejection::LoopBoundary => {
                "selection spans a loop header and body without the whole loop"
            }
            SelectionRejection::CaseLabel => "selection contains a case label",
            SelectionRejection::MonitorBody => {
                "selection is a synchronized body; select the whole statement"
            }
            SelectionRejection::TryBoundary => {
                "selection lands inside a try construct without the whole statement"
            }
        };
        f.write_str(message)
    }
}

/// The maximal run of sibling nodes inside a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSelection {
    pub selection: Location,
    pub nodes: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub rejection: Option<SelectionRejection>,
}

impl StatementSelection {
    /// True when the run may be handed to a changer.
    pub fn covers_valid_statements(&self) -> bool {
        self.rejection.is_none()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

pub fn select_statements(tree: &SyntaxTree, selection: &Location) -> StatementSelection {
    let mut nodes: Vec<NodeId> = Vec::new();
    let mut parent: Option<NodeId> = None;
    let mut closed = false;
    let mut straddled: Vec<NodeId> = Vec::new();

    tree.walk(tree.root(), |id, node| {
        let location = &node.location;
        let run_sibling = !nodes.is_empty() && node.parent == parent;

        if algebra::lies_outside(selection, location) && !algebra::both_same(selection, location) {
            if run_sibling {
                closed = true;
            }
            return Walk::Skip;
        }

        if algebra::covered_by(location, selection) {
            if nodes.is_empty() {
                parent = node.parent;
                nodes.push(id);
            } else if run_sibling && !closed {
                nodes.push(id);
            }
            return Walk::Skip;
        }

        if algebra::covers(location, selection) {
            return Walk::Descend;
        }

        straddled.push(id);
        if run_sibling {
            closed = true;
        }
        Walk::Skip
    });

    let rejection = check(tree, selection, &nodes, parent, &straddled);
    StatementSelection {
        selection: selection.clone(),
        nodes,
        parent,
        rejection,
    }
}

fn check(
    tree: &SyntaxTree,
    selection: &Location,
    nodes: &[NodeId],
    parent: Option<NodeId>,
    straddled: &[NodeId],
) -> Option<SelectionRejection> {
    let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
        return Some(SelectionRejection::Empty);
    };

    let union = tree.location(first).through(tree.location(last));
    if !algebra::both_same(selection, &union) {
        let cut_sibling = straddled
            .iter()
            .any(|id| tree.parent(*id) == parent);
        let escapes_parent = parent
            .map(|p| !algebra::covers(tree.location(p), selection))
            .unwrap_or(false);
        if cut_sibling || escapes_parent {
            return Some(SelectionRejection::Straddles);
        }
    }

    if tree.node(first).kind == NodeKind::ArrayInitializer {
        return Some(SelectionRejection::ArrayInitializer);
    }

    if nodes
        .iter()
        .any(|id| tree.node(*id).kind == NodeKind::SwitchLabel)
    {
        return Some(SelectionRejection::CaseLabel);
    }

    let parent = parent?;
    let parent_kind = tree.node(parent).kind;

    if parent_kind.is_loop() {
        let has_body = nodes.iter().any(|id| tree.node(*id).field == Some("body"));
        let has_header = nodes.iter().any(|id| tree.node(*id).field != Some("body"));
        if has_body && has_header {
            return Some(SelectionRejection::LoopBoundary);
        }
    }

    if parent_kind == NodeKind::Synchronized
        && nodes.len() == 1
        && tree.node(first).field == Some("body")
    {
        return Some(SelectionRejection::MonitorBody);
    }

    if parent_kind.is_try_part() {
        let construct = std::iter::once(parent)
            .chain(tree.ancestors(parent))
            .find(|id| tree.node(*id).kind == NodeKind::Try);
        if let Some(construct) = construct {
            if algebra::starts_after(tree.location(construct), selection) {
                return Some(SelectionRejection::TryBoundary);
            }
        }
    }

    None
}
