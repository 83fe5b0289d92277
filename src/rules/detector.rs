use crate::change::{Cause, CauseName, IssueDetector, Issue};
use crate::rules::errors::RuleError;
use crate::rules::matcher::PatternMatcher;
use crate::rules::Rule;
use crate::select::select_node;
use crate::tree::SyntaxTree;
use tracing::{debug, warn};

/// Raises one issue per match of a rule's pattern.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    rule: Rule,
}

impl PatternDetector {
    pub fn new(rule: Rule) -> Result<Self, RuleError> {
        rule.check()?;
        Ok(Self { rule })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl IssueDetector for PatternDetector {
    fn name(&self) -> &str {
        &self.rule.id
    }

    fn scan(&self, tree: &SyntaxTree) -> Vec<Cause> {
        let source = tree.source();
        let matcher = PatternMatcher::new(source.contents(), self.rule.lang);
        let matches = match matcher.find_all(&self.rule.pattern) {
            Ok(matches) => matches,
            Err(message) => {
                warn!(rule = %self.rule.id, %message, "pattern failed to compile");
                return Vec::new();
            }
        };

        let causes: Vec<Cause> = matches
            .into_iter()
            .filter_map(|m| {
                let location = tree.location_of(m.byte_start..m.byte_end);
                let node = select_node(tree, &location).matched?;
                let description = if self.rule.description.is_empty() {
                    format!("`{}` at {}", m.text, location)
                } else {
                    format!("{} at {}", self.rule.description, location)
                };
                Some(Cause::Issue(Issue {
                    detector: self.rule.id.clone(),
                    name: CauseName::new(self.rule.id.clone(), self.rule.description.clone()),
                    source: source.clone(),
                    affected: vec![node],
                    description,
                    bindings: m.captures.into_iter().collect(),
                }))
            })
            .collect();

        debug!(rule = %self.rule.id, source = source.name(), issues = causes.len(), "scan finished");
        causes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::tree::{Parser, SupportLang, TreeSitterParser};

    fn equals_rule() -> Rule {
        Rule {
            id: "null-unsafe-equals".into(),
            description: "equals on a possibly null receiver".into(),
            pattern: "$L.equals($R)".into(),
            rewrite: Some("Objects.equals($L, $R)".into()),
            lang: SupportLang::Java,
        }
    }

    #[test]
    fn one_issue_per_match() {
        let mut parser = TreeSitterParser::java().unwrap();
        let source = Source::new(
            "A.java",
            "class A { boolean m(String a, String b) { return a.equals(b) || b.equals(a); } }",
        );
        let tree = parser.parse(&source).unwrap();
        let detector = PatternDetector::new(equals_rule()).unwrap();

        let causes = detector.scan(&tree);
        assert_eq!(causes.len(), 2);

        let first = &causes[0];
        assert_eq!(first.detector(), Some("null-unsafe-equals"));
        assert_eq!(tree.text(first.affected()[0]), "a.equals(b)");
        let bindings = first.bindings().unwrap();
        assert_eq!(bindings.get("L").map(String::as_str), Some("a"));
        assert!(first.description().starts_with("equals on a possibly null receiver at"));
    }

    #[test]
    fn clean_source_has_no_issues() {
        let mut parser = TreeSitterParser::java().unwrap();
        let tree = parser
            .parse(&Source::new("A.java", "class A { int x; }"))
            .unwrap();
        let detector = PatternDetector::new(equals_rule()).unwrap();
        assert!(detector.scan(&tree).is_empty());
    }
}
