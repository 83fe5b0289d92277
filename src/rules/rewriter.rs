use crate::change::{Cause, ChangeError, Changer, Parameters, Rewrite};
use crate::edit::TextEdit;
use crate::rules::errors::RuleError;
use crate::rules::matcher::expand_template;
use crate::rules::Rule;
use crate::tree::SyntaxTree;
use std::collections::HashMap;

/// Rewrites the nodes flagged by one rule with that rule's template.
#[derive(Debug, Clone)]
pub struct TemplateChanger {
    name: String,
    rule_id: String,
    template: String,
}

impl TemplateChanger {
    /// `None` when the rule has no rewrite.
    pub fn from_rule(rule: &Rule) -> Result<Option<Self>, RuleError> {
        rule.check()?;
        Ok(rule.rewrite.as_ref().map(|template| Self {
            name: format!("rewrite:{}", rule.id),
            rule_id: rule.id.clone(),
            template: template.clone(),
        }))
    }
}

impl Changer for TemplateChanger {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, cause: &Cause) -> bool {
        cause.detector() == Some(self.rule_id.as_str())
    }

    fn check(&self, cause: &Cause, tree: &SyntaxTree, _params: &Parameters) -> Vec<String> {
        if cause.affected().is_empty() {
            return vec!["issue has no affected node".to_string()];
        }
        cause
            .affected()
            .iter()
            .filter(|id| tree.get(**id).is_none())
            .map(|id| format!("node {} is not part of {}", id.index(), tree.source().name()))
            .collect()
    }

    fn rewrite(
        &self,
        cause: &Cause,
        tree: &SyntaxTree,
        params: &Parameters,
    ) -> Result<Rewrite, ChangeError> {
        // Parameters may override captured bindings.
        let mut captures: HashMap<String, String> = cause
            .bindings()
            .map(|bindings| bindings.clone().into_iter().collect())
            .unwrap_or_default();
        captures.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        let contents = tree.source().contents();
        let edits = cause
            .affected()
            .iter()
            .map(|id| {
                let node = tree.get(*id).ok_or_else(|| ChangeError::Rewrite {
                    changer: self.name.clone(),
                    reason: format!("node {} is not part of {}", id.index(), tree.source().name()),
                })?;
                Ok(TextEdit::replace(
                    contents,
                    node.location.byte_range(),
                    expand_template(&self.template, &captures),
                ))
            })
            .collect::<Result<Vec<_>, ChangeError>>()?;

        Ok(Rewrite::Edits(edits))
    }
}
