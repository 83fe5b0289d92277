//! Arena-backed syntax trees.
//!
//! Nodes are addressed by [`NodeId`], an index into the tree that owns them.
//! Causes and changes hold ids, never references, so a discarded revision
//! cannot leave anything dangling: a stale id simply fails to resolve against
//! a newer tree.

use crate::location::Location;
use crate::source::{LineIndex, Source};
use crate::tree::kind::NodeKind;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One named node of a parsed source.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Kind name as reported by the grammar.
    pub grammar_kind: &'static str,
    /// Field name under which the parent holds this node.
    pub field: Option<&'static str>,
    pub location: Location,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Byte span of an ERROR or MISSING node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxErrorSpan {
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Traversal control returned by a [`SyntaxTree::walk`] visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
    Stop,
}

/// A parsed source revision. The tree keeps the revision it was built from,
/// so any node can name its owning [`Source`].
pub struct SyntaxTree {
    source: Source,
    nodes: Vec<Node>,
    errors: Vec<SyntaxErrorSpan>,
    lines: LineIndex,
    pub(crate) backend: Option<tree_sitter::Tree>,
}

impl SyntaxTree {
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree. Use [`SyntaxTree::get`]
    /// for ids of unknown provenance.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn location(&self, id: NodeId) -> &Location {
        &self.node(id).location
    }

    /// Source text spanned by a node.
    pub fn text(&self, id: NodeId) -> &str {
        let range = self.location(id).byte_range();
        self.source.contents().get(range).unwrap_or("")
    }

    /// First child held under `field`.
    pub fn field_child(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).field == Some(field))
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Pre-order iterator over `start` and everything below it.
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        let stack = if self.get(start).is_some() {
            vec![start]
        } else {
            Vec::new()
        };
        Descendants { tree: self, stack }
    }

    /// Depth-first, pre-order walk from `start`. The visitor decides per node
    /// whether to enter its children, skip them, or end the walk.
    pub fn walk<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, &Node) -> Walk,
    {
        if self.get(start).is_none() {
            return;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match visit(id, node) {
                Walk::Descend => stack.extend(node.children.iter().rev().copied()),
                Walk::Skip => {}
                Walk::Stop => return,
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SyntaxErrorSpan] {
        &self.errors
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Location of a byte range (end exclusive) in this tree's source.
    pub fn location_of(&self, range: Range<usize>) -> Location {
        self.lines.location(self.source.source_ref(), range)
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("source", &self.source.name())
            .field("nodes", &self.nodes.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}

/// A node together with the tree that owns it.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'t Node {
        self.tree.node(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    pub fn text(&self) -> &'t str {
        self.tree.text(self.id)
    }

    /// The source revision this node was parsed from.
    pub fn source(&self) -> &'t Source {
        self.tree.source()
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.parent(self.id).map(|id| self.tree.node_ref(id))
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.node().grammar_kind, self.node().location)
    }
}

pub struct Ancestors<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Incremental construction of a [`SyntaxTree`] by any parser backend.
///
/// Nodes must be pushed in pre-order; the first node pushed is the root.
pub struct TreeBuilder {
    source: Source,
    lines: LineIndex,
    nodes: Vec<Node>,
    errors: Vec<SyntaxErrorSpan>,
}

impl TreeBuilder {
    pub fn new(source: Source) -> Self {
        let lines = LineIndex::new(source.contents());
        Self {
            source,
            lines,
            nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Append a node spanning `range` (end exclusive) under `parent`.
    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        grammar_kind: &'static str,
        field: Option<&'static str>,
        range: Range<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let location = self.lines.location(self.source.source_ref(), range);
        self.nodes.push(Node {
            kind,
            grammar_kind,
            field,
            location,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn record_error(&mut self, range: Range<usize>) {
        self.errors.push(SyntaxErrorSpan {
            byte_start: range.start,
            byte_end: range.end,
        });
    }

    pub fn finish(self) -> SyntaxTree {
        self.finish_with_backend(None)
    }

    pub(crate) fn finish_with_backend(self, backend: Option<tree_sitter::Tree>) -> SyntaxTree {
        SyntaxTree {
            source: self.source,
            nodes: self.nodes,
            errors: self.errors,
            lines: self.lines,
            backend,
        }
    }
}
