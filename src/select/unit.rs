//! Finding declarations by name.

use crate::location::Location;
use crate::select::node::select_node;
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The sort of declaration a name lookup is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Method,
    Field,
    Parameter,
    InnerClass,
}

impl UnitKind {
    /// Whether `declaration` (the parent of a name identifier) declares a
    /// unit of this kind.
    fn declares(self, tree: &SyntaxTree, declaration: NodeId) -> bool {
        let kind = tree.node(declaration).kind;
        let parent_kind = tree.parent(declaration).map(|id| tree.node(id).kind);
        match self {
            UnitKind::Method => matches!(kind, NodeKind::Method | NodeKind::Constructor),
            UnitKind::Field => {
                kind == NodeKind::VariableDeclarator && parent_kind == Some(NodeKind::Field)
            }
            UnitKind::Parameter => kind == NodeKind::Parameter,
            UnitKind::InnerClass => {
                kind == NodeKind::TypeDeclaration && parent_kind == Some(NodeKind::TypeBody)
            }
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Method => "method",
            UnitKind::Field => "field",
            UnitKind::Parameter => "parameter",
            UnitKind::InnerClass => "inner_class",
        };
        f.write_str(name)
    }
}

impl FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "method" => Ok(UnitKind::Method),
            "field" => Ok(UnitKind::Field),
            "parameter" | "param" => Ok(UnitKind::Parameter),
            "inner_class" | "class" => Ok(UnitKind::InnerClass),
            other => Err(format!("unknown unit kind: {other}")),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Locations of every declaration of `kind` named `name`.
///
/// Each textual occurrence of the name is resolved to a node; it counts only
/// if it is the `name` of a matching declaration, so uses and substrings of
/// longer identifiers are ignored.
pub fn locate_units(tree: &SyntaxTree, name: &str, kind: UnitKind) -> BTreeSet<Location> {
    let mut found = BTreeSet::new();
    if name.is_empty() {
        return found;
    }

    let text = tree.source().contents();
    for (start, _) in text.match_indices(name) {
        let end = start + name.len();
        let bounded_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_char(c));
        let bounded_after = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_identifier_char(c));
        if !bounded_before || !bounded_after {
            continue;
        }

        let selection = tree.location_of(start..end);
        let resolved = select_node(tree, &selection);
        // A declarator without initializer spans exactly its name, so the
        // identifier can be the covering node rather than the match.
        let name_node = [resolved.matched, resolved.covering]
            .into_iter()
            .flatten()
            .find(|id| {
                let node = tree.node(*id);
                node.kind == NodeKind::Identifier && node.field == Some("name")
            });
        let Some(name_node) = name_node else {
            continue;
        };
        if let Some(declaration) = tree.parent(name_node) {
            if kind.declares(tree, declaration) {
                found.insert(tree.location(declaration).clone());
            }
        }
    }
    found
}
