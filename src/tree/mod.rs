//! Parsed syntax trees.
//!
//! Parsing is a pluggable capability ([`Parser`]); the default backend is
//! tree-sitter with the grammars bundled by ast-grep-language. Whatever the
//! backend, the result is an arena [`SyntaxTree`] of named nodes with
//! semantic [`NodeKind`]s, which is all the selection resolvers look at.

pub mod arena;
pub mod errors;
pub mod kind;
pub mod parser;
pub mod validator;

pub use arena::{Node, NodeId, NodeRef, SyntaxErrorSpan, SyntaxTree, TreeBuilder, Walk};
pub use errors::TreeError;
pub use kind::{classify, language_from_name, NodeKind, SupportLang};
pub use parser::{Parser, TreeSitterParser};
pub use validator::validate_rewrite;
