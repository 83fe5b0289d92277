use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse {source_name}")]
    ParseFailed { source_name: String },

    #[error("no syntax tree available for {source_name}")]
    NoTree { source_name: String },

    #[error("rewrite introduces {count} syntax error(s), first at byte {byte_start}..{byte_end}")]
    SyntaxErrorIntroduced {
        count: usize,
        byte_start: usize,
        byte_end: usize,
    },
}
