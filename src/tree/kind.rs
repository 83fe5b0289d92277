//! Semantic node kinds and per-language classification.
//!
//! Selection legality is defined over constructs (loops, switch labels, try
//! clauses), not grammar names, so every backend maps its own kind names onto
//! [`NodeKind`]. Java is fully classified; other grammars fall back to a
//! name-based guess that is good enough for single-node resolution.

pub use ast_grep_language::SupportLang;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    CompilationUnit,
    TypeDeclaration,
    TypeBody,
    Method,
    Constructor,
    Field,
    Parameter,
    VariableDeclarator,
    LocalVariable,
    Block,
    Statement,
    Expression,
    Identifier,
    ForLoop,
    WhileLoop,
    DoLoop,
    Switch,
    SwitchLabel,
    Synchronized,
    Try,
    Catch,
    CatchParameter,
    Finally,
    ArrayInitializer,
    Comment,
    Error,
    Other,
}

impl NodeKind {
    pub fn is_loop(self) -> bool {
        matches!(self, NodeKind::ForLoop | NodeKind::WhileLoop | NodeKind::DoLoop)
    }

    /// Try statements and their direct clauses.
    pub fn is_try_part(self) -> bool {
        matches!(
            self,
            NodeKind::Try | NodeKind::Catch | NodeKind::CatchParameter | NodeKind::Finally
        )
    }
}

/// Resolve a configured language name.
pub fn language_from_name(name: &str) -> Option<SupportLang> {
    match name.trim().to_ascii_lowercase().as_str() {
        "java" => Some(SupportLang::Java),
        "kotlin" | "kt" => Some(SupportLang::Kotlin),
        "csharp" | "c#" | "cs" => Some(SupportLang::CSharp),
        "rust" | "rs" => Some(SupportLang::Rust),
        "go" => Some(SupportLang::Go),
        "javascript" | "js" => Some(SupportLang::JavaScript),
        "typescript" | "ts" => Some(SupportLang::TypeScript),
        "python" | "py" => Some(SupportLang::Python),
        _ => None,
    }
}

/// File extensions a language's sources usually carry.
pub fn extensions(lang: SupportLang) -> &'static [&'static str] {
    match lang {
        SupportLang::Java => &["java"],
        SupportLang::Kotlin => &["kt", "kts"],
        SupportLang::CSharp => &["cs"],
        SupportLang::Rust => &["rs"],
        SupportLang::Go => &["go"],
        SupportLang::JavaScript => &["js", "mjs", "cjs"],
        SupportLang::TypeScript => &["ts"],
        SupportLang::Python => &["py"],
        _ => &[],
    }
}

pub fn classify(lang: SupportLang, kind: &str) -> NodeKind {
    match lang {
        SupportLang::Java => classify_java(kind),
        _ => classify_generic(kind),
    }
}

fn classify_java(kind: &str) -> NodeKind {
    match kind {
        "program" => NodeKind::CompilationUnit,
        "class_declaration"
        | "interface_declaration"
        | "enum_declaration"
        | "record_declaration"
        | "annotation_type_declaration" => NodeKind::TypeDeclaration,
        "class_body" | "interface_body" | "enum_body" | "enum_body_declarations"
        | "annotation_type_body" => NodeKind::TypeBody,
        "method_declaration" => NodeKind::Method,
        "constructor_declaration" | "compact_constructor_declaration" => NodeKind::Constructor,
        "field_declaration" | "constant_declaration" => NodeKind::Field,
        "formal_parameter" | "spread_parameter" => NodeKind::Parameter,
        "variable_declarator" => NodeKind::VariableDeclarator,
        "local_variable_declaration" => NodeKind::LocalVariable,
        "block" | "constructor_body" => NodeKind::Block,
        "for_statement" | "enhanced_for_statement" => NodeKind::ForLoop,
        "while_statement" => NodeKind::WhileLoop,
        "do_statement" => NodeKind::DoLoop,
        "switch_expression" | "switch_statement" => NodeKind::Switch,
        "switch_label" => NodeKind::SwitchLabel,
        "synchronized_statement" => NodeKind::Synchronized,
        "try_statement" | "try_with_resources_statement" => NodeKind::Try,
        "catch_clause" => NodeKind::Catch,
        "catch_formal_parameter" => NodeKind::CatchParameter,
        "finally_clause" => NodeKind::Finally,
        "array_initializer" => NodeKind::ArrayInitializer,
        "identifier" | "type_identifier" => NodeKind::Identifier,
        "line_comment" | "block_comment" => NodeKind::Comment,
        "ERROR" => NodeKind::Error,
        "expression_statement" | "if_statement" | "return_statement" | "throw_statement"
        | "break_statement" | "continue_statement" | "yield_statement"
        | "labeled_statement" | "assert_statement" | "explicit_constructor_invocation" => {
            NodeKind::Statement
        }
        other if other.ends_with("_expression")
            || other.ends_with("_literal")
            || other == "method_invocation"
            || other == "object_creation_expression"
            || other == "field_access"
            || other == "array_access" =>
        {
            NodeKind::Expression
        }
        _ => NodeKind::Other,
    }
}

fn classify_generic(kind: &str) -> NodeKind {
    match kind {
        "ERROR" => NodeKind::Error,
        "source_file" | "program" | "module" | "compilation_unit" => NodeKind::CompilationUnit,
        other if other.contains("comment") => NodeKind::Comment,
        other if other.ends_with("identifier") => NodeKind::Identifier,
        other if other == "block" || other.ends_with("_block") => NodeKind::Block,
        other if other.starts_with("for_") => NodeKind::ForLoop,
        other if other.starts_with("while_") => NodeKind::WhileLoop,
        other if other.ends_with("_statement") => NodeKind::Statement,
        other if other.ends_with("_expression") => NodeKind::Expression,
        _ => NodeKind::Other,
    }
}
