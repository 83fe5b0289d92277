//! Refactorer: selection-aware refactoring engine
//!
//! Resolves editor selections to syntax nodes, turns detected issues and user
//! intents into validated changes, and records every committed change in a
//! per-file timeline that can be walked forwards and backwards.
//!
//! # Architecture
//!
//! - [`source`]: immutable revisions of a file, grouped by signature.
//! - [`location`]: positions and the interval algebra selections rely on.
//! - [`tree`]: tree-sitter parsing into an arena tree with language-neutral
//!   node kinds.
//! - [`select`]: node, statement-run and declaration selection.
//! - [`change`]: causes, changers and the changes between them.
//! - [`edit`] and [`diff`]: verified byte-span edits, line patches, merge.
//! - [`commit`] and [`repository`]: commits, histories and where they land.
//! - [`rules`]: ast-grep pattern rules as detectors and changers.
//! - [`engine`]: ties the above together behind one owner.
//!
//! # Safety
//!
//! - Edits verify the text they replace before applying
//! - A rewrite that introduces syntax errors is never committed
//! - Local repositories write atomically (tempfile + fsync + rename) and refuse
//!   paths outside their root
//!
//! # Example
//!
//! ```no_run
//! use refactorer::{Engine, Source};
//!
//! let mut engine = Engine::builder().build()?;
//! let source = Source::new("A.java", "class A { void m() { int x = 1; } }");
//! engine.register(&source)?;
//! let selection = source.location(21..31);
//! let statements = engine.select_statements(&source, &selection)?;
//! assert!(statements.covers_valid_statements());
//! # Ok::<(), refactorer::EngineError>(())
//! ```

pub mod change;
pub mod commit;
pub mod config;
pub mod diff;
pub mod edit;
pub mod engine;
pub mod location;
pub mod repository;
pub mod rules;
pub mod select;
pub mod source;
pub mod tree;

// Re-exports
pub use change::{Cause, CauseName, Change, ChangeError, Changer, Delta, IssueDetector, Parameters};
pub use commit::{Commit, CommitHistory, CommitSummary, HistoryError, Timeline};
pub use config::{load_from_path, load_from_str, ConfigError, EngineConfig};
pub use diff::{DiffError, Patch, Reconciliation};
pub use edit::{apply_edits, EditError, EditVerification, TextEdit};
pub use engine::{Engine, EngineBuilder, EngineError};
pub use location::{Location, Position, Relation};
pub use repository::{InMemoryRepository, LocalRepository, Repository, RepositoryError};
pub use rules::{PatternDetector, Rule, RuleError, TemplateChanger};
pub use select::{NodeSelection, SelectionRejection, StatementSelection, UnitKind};
pub use source::{Signature, Source};
pub use tree::{NodeId, NodeKind, Parser, SupportLang, SyntaxTree, TreeError, TreeSitterParser};
