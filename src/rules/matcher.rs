use crate::rules::cache;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;
use std::collections::HashMap;

/// A match from an ast-grep pattern with captured metavariables.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
    /// Captured metavariables: name -> text
    pub captures: HashMap<String, String>,
}

/// Pattern matcher over one text, using ast-grep's metavariable syntax.
///
/// - `$NAME` matches a single node and captures it
/// - `$$$NAME` matches zero or more nodes
/// - `$_` matches any single node without capturing
///
/// ```text
/// $OBJ.equals($OTHER)                 // Java equality calls
/// System.out.println($$$ARGS)         // console output
/// ```
pub struct PatternMatcher {
    lang: SupportLang,
    sg: AstGrep<StrDoc<SupportLang>>,
}

impl PatternMatcher {
    pub fn new(source: &str, lang: SupportLang) -> Self {
        Self {
            lang,
            sg: AstGrep::new(source, lang),
        }
    }

    /// All matches of `pattern`, in document order.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<PatternMatch>, String> {
        let pat = cache::get_or_compile_pattern(pattern, self.lang)?;
        let root = self.sg.root();
        Ok(root.find_all(&pat).map(to_pattern_match).collect())
    }

    pub fn has_match(&self, pattern: &str) -> bool {
        cache::get_or_compile_pattern(pattern, self.lang)
            .map(|pat| self.sg.root().find(&pat).is_some())
            .unwrap_or(false)
    }
}

fn to_pattern_match(m: NodeMatch<StrDoc<SupportLang>>) -> PatternMatch {
    let node = m.get_node();
    let range = node.range();
    let text = node.text().to_string();
    let captures: HashMap<String, String> = m.get_env().clone().into();

    PatternMatch {
        byte_start: range.start,
        byte_end: range.end,
        text,
        captures,
    }
}

/// Fill `$NAME` and `$$$NAME` placeholders in `template` from `captures`.
///
/// Longer names are substituted first so `$AB` is never read as `$A`
/// followed by `B`.
pub fn expand_template(template: &str, captures: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = captures.keys().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut result = template.to_string();
    for name in names {
        let value = &captures[name];
        result = result.replace(&format!("$$${name}"), value);
        result = result.replace(&format!("${name}"), value);
    }
    result
}

/// Metavariable names used in a pattern or template, without `$` sigils.
pub fn metavariables(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(position) = rest.find('$') {
        let after = rest[position..].trim_start_matches('$');
        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
            .collect();
        if !name.is_empty() && name != "_" && !names.contains(&name) {
            names.push(name.clone());
        }
        rest = &after[name.len()..];
    }
    names
}
