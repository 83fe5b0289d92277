//! Configuration-driven detectors and changers built on ast-grep patterns.
//!
//! A [`Rule`] pairs a pattern with an optional rewrite template. The pattern
//! becomes a [`PatternDetector`]; a rewrite, when present, becomes a
//! [`TemplateChanger`] that handles exactly the issues that rule raises.

pub mod cache;
pub mod detector;
pub mod errors;
pub mod matcher;
pub mod rewriter;

pub use detector::PatternDetector;
pub use errors::RuleError;
pub use matcher::{expand_template, PatternMatch, PatternMatcher};
pub use rewriter::TemplateChanger;

use ast_grep_language::SupportLang;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub pattern: String,
    pub rewrite: Option<String>,
    pub lang: SupportLang,
}

impl Rule {
    /// Compile the pattern and check that the rewrite only uses
    /// metavariables the pattern binds.
    pub fn check(&self) -> Result<(), RuleError> {
        cache::get_or_compile_pattern(&self.pattern, self.lang).map_err(|message| {
            RuleError::InvalidPattern {
                rule: self.id.clone(),
                pattern: self.pattern.clone(),
                message,
            }
        })?;

        if let Some(rewrite) = &self.rewrite {
            if rewrite.trim().is_empty() {
                return Err(RuleError::EmptyRewrite {
                    rule: self.id.clone(),
                });
            }
            let bound = matcher::metavariables(&self.pattern);
            if let Some(name) = matcher::metavariables(rewrite)
                .into_iter()
                .find(|name| !bound.contains(name))
            {
                return Err(RuleError::UnboundMetavariable {
                    rule: self.id.clone(),
                    name,
                });
            }
        }
        Ok(())
    }
}
