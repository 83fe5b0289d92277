use crate::source::{LineIndex, Source};
use crate::tree::arena::{NodeId, SyntaxTree, TreeBuilder};
use crate::tree::errors::TreeError;
use crate::tree::kind::{classify, SupportLang};
use ast_grep_language::LanguageExt;
use tracing::debug;
use tree_sitter::{InputEdit, Point, TreeCursor};

/// Turns source text into a [`SyntaxTree`].
pub trait Parser: Send {
    fn parse(&mut self, source: &Source) -> Result<SyntaxTree, TreeError>;

    /// Parse a newer revision of a source that `previous` was built from.
    ///
    /// Backends without incremental support parse from scratch.
    fn reparse(&mut self, previous: &SyntaxTree, source: &Source) -> Result<SyntaxTree, TreeError> {
        let _ = previous;
        self.parse(source)
    }
}

/// Tree-sitter backend using the grammars bundled with ast-grep-language.
pub struct TreeSitterParser {
    parser: tree_sitter::Parser,
    lang: SupportLang,
}

impl TreeSitterParser {
    pub fn new(lang: SupportLang) -> Result<Self, TreeError> {
        let mut parser = tree_sitter::Parser::new();
        let ts_lang = lang.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeError::LanguageSet)?;

        Ok(Self { parser, lang })
    }

    pub fn java() -> Result<Self, TreeError> {
        Self::new(SupportLang::Java)
    }

    pub fn lang(&self) -> SupportLang {
        self.lang
    }

    fn run(
        &mut self,
        source: &Source,
        hint: Option<&tree_sitter::Tree>,
    ) -> Result<SyntaxTree, TreeError> {
        let tree = self
            .parser
            .parse(source.contents(), hint)
            .ok_or_else(|| TreeError::ParseFailed {
                source_name: source.name().to_string(),
            })?;
        Ok(build(self.lang, source.clone(), tree))
    }
}

impl Parser for TreeSitterParser {
    fn parse(&mut self, source: &Source) -> Result<SyntaxTree, TreeError> {
        self.run(source, None)
    }

    fn reparse(&mut self, previous: &SyntaxTree, source: &Source) -> Result<SyntaxTree, TreeError> {
        let old_text = previous.source().contents();
        let Some(mut hint) = previous.backend.clone() else {
            return self.run(source, None);
        };
        match input_edit(old_text, source.contents()) {
            Some(edit) => {
                debug!(
                    source = source.name(),
                    start = edit.start_byte,
                    old_end = edit.old_end_byte,
                    new_end = edit.new_end_byte,
                    "incremental re-parse"
                );
                hint.edit(&edit);
                self.run(source, Some(&hint))
            }
            None => self.run(source, Some(&hint)),
        }
    }
}

/// Describe the change between two texts as one edit spanning everything
/// outside their common prefix and suffix.
fn input_edit(old: &str, new: &str) -> Option<InputEdit> {
    if old == new {
        return None;
    }

    let mut prefix = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = (old.len() - prefix).min(new.len() - prefix);
    let mut suffix = old
        .bytes()
        .rev()
        .zip(new.bytes().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix) {
        suffix -= 1;
    }

    let old_lines = LineIndex::new(old);
    let new_lines = LineIndex::new(new);
    let point = |lines: &LineIndex, offset: usize| {
        let (row, column) = lines.row_column(offset);
        Point::new(row, column)
    };

    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;
    Some(InputEdit {
        start_byte: prefix,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: point(&old_lines, prefix),
        old_end_position: point(&old_lines, old_end),
        new_end_position: point(&new_lines, new_end),
    })
}

fn build(lang: SupportLang, source: Source, tree: tree_sitter::Tree) -> SyntaxTree {
    let mut builder = TreeBuilder::new(source);
    {
        let root = tree.root_node();
        if root.is_error() {
            builder.record_error(root.byte_range());
        }
        let root_id = builder.push(
            None,
            classify(lang, root.kind()),
            root.kind(),
            None,
            root.byte_range(),
        );
        let mut cursor = root.walk();
        collect_children(lang, &mut builder, &mut cursor, root_id);
    }
    builder.finish_with_backend(Some(tree))
}

/// Push the named children under the cursor's current node, recursively.
/// Anonymous tokens are left out of the arena; ERROR and MISSING nodes are
/// recorded either way.
fn collect_children(
    lang: SupportLang,
    builder: &mut TreeBuilder,
    cursor: &mut TreeCursor<'_>,
    parent: NodeId,
) {
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            builder.record_error(node.byte_range());
        }
        if node.is_named() && !node.is_missing() {
            let id = builder.push(
                Some(parent),
                classify(lang, node.kind()),
                node.kind(),
                cursor.field_name(),
                node.byte_range(),
            );
            collect_children(lang, builder, cursor, id);
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    cursor.goto_parent();
}
