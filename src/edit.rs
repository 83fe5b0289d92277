use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Byte-span replacement with before-text verification.
///
/// Changers describe rewrites as a list of these; the pipeline applies them
/// to one revision's text to produce the next.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until applied"]
pub struct TextEdit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    pub new_text: String,
    /// What the span must hold before the edit applies
    pub expected_before: EditVerification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text, used for large spans
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Hash spans over 1KB, compare smaller ones verbatim.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("Before-text verification failed at byte {byte_start}: found {found:?}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("Edits overlap at bytes [{byte_start}, {byte_end})")]
    Overlapping { byte_start: usize, byte_end: usize },

    #[error("Edit boundary at byte {0} splits a UTF-8 character")]
    NotCharBoundary(usize),
}

impl TextEdit {
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before.as_ref()),
        }
    }

    /// Replace the span with `new_text`, taking the current span text as the
    /// expected before-text.
    pub fn replace(content: &str, range: std::ops::Range<usize>, new_text: impl Into<String>) -> Self {
        let before = content.get(range.clone()).unwrap_or("");
        Self::new(range.start, range.end, new_text, before)
    }

    pub fn insert(at: usize, new_text: impl Into<String>) -> Self {
        Self::new(at, at, new_text, "")
    }

    /// Check the edit against `content`, returning the text currently held by
    /// the span.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }
        for boundary in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(boundary) {
                return Err(EditError::NotCharBoundary(boundary));
            }
        }

        let current = &content[self.byte_start..self.byte_end];

        // Already applied
        if current == self.new_text {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }
        Ok(current)
    }
}

/// Apply a set of edits to one text in a single pass.
///
/// Edits are applied bottom-to-top so earlier offsets stay valid. Every edit
/// is validated before any is applied; overlapping spans are rejected.
pub fn apply_edits(content: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.byte_start.cmp(&a.byte_start).then(b.byte_end.cmp(&a.byte_end)));

    for edit in &ordered {
        edit.validate(content)?;
    }

    // Sorted descending: the earlier edit must end at or before the later starts.
    for window in ordered.windows(2) {
        let (later, earlier) = (window[0], window[1]);
        if earlier.byte_end > later.byte_start
            || (earlier.byte_start == later.byte_start && earlier.byte_end > earlier.byte_start)
        {
            return Err(EditError::Overlapping {
                byte_start: later.byte_start,
                byte_end: earlier.byte_end,
            });
        }
    }

    let mut result = content.to_string();
    for edit in ordered {
        if &result[edit.byte_start..edit.byte_end] == edit.new_text {
            continue;
        }
        result.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }
    Ok(result)
}
