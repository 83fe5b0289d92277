//! Source documents and their revision identity.
//!
//! A [`Source`] is immutable: every edit produces a new revision that shares
//! the [`Signature`] of the document it was derived from. The signature is the
//! key of the file's commit timeline, independent of its contents.

use crate::location::{Location, Position};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a logical file, assigned once at first registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Signature(Uuid);

impl Signature {
    /// Allocate a fresh signature.
    pub fn generate() -> Self {
        Signature(Uuid::new_v4())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lightweight handle naming the document a [`Location`] points into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceRef {
    pub name: Arc<str>,
    pub signature: Signature,
}

/// One revision of a text document.
///
/// Equality is signature plus contents: two revisions of the same file with
/// identical text are the same point on its timeline, whatever their version
/// tags say.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    name: Arc<str>,
    contents: Arc<str>,
    signature: Signature,
    remote_id: Option<String>,
    version: Option<String>,
}

impl Source {
    /// Create the first revision of a document, allocating a new signature.
    pub fn new(name: impl Into<Arc<str>>, contents: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            signature: Signature::generate(),
            remote_id: None,
            version: None,
        }
    }

    /// Derive the next revision. Signature, name and remote id carry forward;
    /// the version tag does not.
    pub fn revise(&self, contents: impl Into<Arc<str>>) -> Self {
        Self {
            name: self.name.clone(),
            contents: contents.into(),
            signature: self.signature,
            remote_id: self.remote_id.clone(),
            version: None,
        }
    }

    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Identifier used when talking to a repository: remote id when known,
    /// otherwise the document name.
    pub fn repository_id(&self) -> &str {
        self.remote_id.as_deref().unwrap_or(&self.name)
    }

    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            name: self.name.clone(),
            signature: self.signature,
        }
    }

    /// Location of a byte range, end exclusive. An empty range yields the
    /// same one-byte location as `start..start + 1`.
    pub fn location(&self, range: Range<usize>) -> Location {
        LineIndex::new(&self.contents).location(self.source_ref(), range)
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature && self.contents == other.contents
    }
}

impl Eq for Source {}

impl Hash for Source {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
        self.contents.hash(state);
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Byte offset to line/column mapping for one revision's text.
///
/// Lines and columns are 1-based; columns count bytes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Zero-based (row, byte column) of an offset, clamped to the text.
    pub fn row_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        (row, offset - self.line_starts[row])
    }

    pub fn position(&self, offset: usize) -> Position {
        let (row, column) = self.row_column(offset);
        Position::new(row as i64 + 1, column as i64 + 1, offset as i64)
    }

    /// Location covering `range`; the stored end is the last byte inside it.
    pub fn location(&self, source: SourceRef, range: Range<usize>) -> Location {
        let last = if range.end > range.start {
            range.end - 1
        } else {
            range.start
        };
        Location::new(source, self.position(range.start), self.position(last))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_share_signature() {
        let first = Source::new("A.java", "class A {}");
        let second = first.revise("class A { int x; }");
        assert_eq!(first.signature(), second.signature());
        assert_ne!(first, second);
        assert_eq!(second.name(), "A.java");
    }

    #[test]
    fn equality_ignores_version_tag() {
        let source = Source::new("A.java", "class A {}");
        let tagged = source.clone().with_version("v2");
        assert_eq!(source, tagged);
        assert_eq!(tagged.to_string(), "A.java@v2");
    }

    #[test]
    fn repository_id_prefers_remote_id() {
        let source = Source::new("A.java", "class A {}");
        assert_eq!(source.repository_id(), "A.java");

        let tracked = source.with_remote_id("src/main/A.java");
        assert_eq!(tracked.revise("class A { }").repository_id(), "src/main/A.java");
    }

    #[test]
    fn distinct_documents_do_not_compare_equal() {
        let a = Source::new("A.java", "class A {}");
        let b = Source::new("A.java", "class A {}");
        assert_ne!(a, b);
    }

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(0), Position::new(1, 1, 0));
        assert_eq!(index.position(3), Position::new(2, 1, 3));
        assert_eq!(index.position(4), Position::new(2, 2, 4));
        assert_eq!(index.position(6), Position::new(3, 1, 6));
        assert_eq!(index.position(8), Position::new(4, 2, 8));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn empty_range_equals_single_byte() {
        let source = Source::new("A.java", "int x;");
        assert_eq!(source.location(4..4), source.location(4..5));
        assert!(source.location(4..4).is_point());
    }

    #[test]
    fn location_end_is_inclusive() {
        let source = Source::new("A.java", "int x;");
        let location = source.location(4..5);
        assert_eq!(location.start.offset, 4);
        assert_eq!(location.end.offset, 4);
        assert!(location.is_point());
    }
}
