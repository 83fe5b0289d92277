use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule '{rule}': invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error("rule '{rule}': metavariable ${name} used in rewrite is not bound by the pattern")]
    UnboundMetavariable { rule: String, name: String },

    #[error("rule '{rule}': rewrite is empty")]
    EmptyRewrite { rule: String },
}
