use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Hunk at line {line} expected {expected:?}, found {found:?}")]
    Mismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Hunk at line {line} runs past the end of a {len}-line text")]
    OutOfRange { line: usize, len: usize },

    #[error("Patched text of {source_name} does not match the revised contents")]
    Unreconciled { source_name: String },

    #[error("Variant {variant} conflicts with an earlier variant at line {line}")]
    Conflict { variant: usize, line: usize },

    #[error("Variant {variant} belongs to a different file than the base")]
    ForeignVariant { variant: usize },
}
