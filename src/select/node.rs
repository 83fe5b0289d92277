//! Single-node resolution: which node does a selection mean?
//!
//! The answer is the smallest node containing the selection, unless the
//! selection lands on a node's boundaries, in which case it is that node.

use crate::location::{algebra, Location};
use crate::tree::{NodeId, SyntaxTree, Walk};

/// Outcome of resolving one selection against one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSelection {
    /// Deepest node whose location covers the selection.
    pub covering: Option<NodeId>,
    /// Outermost node, at or below the covering node, the selection covers.
    pub covered: Option<NodeId>,
    /// The node the selection denotes.
    pub matched: Option<NodeId>,
}

pub fn select_node(tree: &SyntaxTree, selection: &Location) -> NodeSelection {
    let mut covering: Option<NodeId> = None;
    let mut covered: Option<NodeId> = None;

    tree.walk(tree.root(), |id, node| {
        let location = &node.location;
        if algebra::lies_outside(selection, location) && !algebra::both_same(selection, location) {
            return Walk::Skip;
        }

        if let Some(found) = covered {
            // Past the covered node only its equally-sized descendants matter.
            let found_location = tree.location(found);
            if tree.is_ancestor(found, id) && algebra::both_same(location, found_location) {
                if algebra::covers(location, selection) {
                    covering = Some(id);
                }
                return Walk::Descend;
            }
            return Walk::Skip;
        }

        let covers_selection = algebra::covers(location, selection);
        if covers_selection {
            covering = Some(id);
        }
        if algebra::covered_by(location, selection) {
            covered = Some(id);
            return Walk::Descend;
        }
        if covers_selection {
            Walk::Descend
        } else {
            // Straddles the selection: nothing inside can contain it, and
            // pieces of it are not what the selection denotes.
            Walk::Skip
        }
    });

    let matched = match covered {
        Some(found) if algebra::covers(tree.location(found), selection) => Some(found),
        _ => covering,
    };

    NodeSelection {
        covering,
        covered,
        matched,
    }
}
