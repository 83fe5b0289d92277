//! The refactoring engine: parsed-tree cache, detectors, changers, and the
//! commit timeline behind one owner.
//!
//! Requests against one source must be serialized by the caller. A change
//! targets one revision's tree; committing anything else in between makes it
//! stale, and the engine refuses it rather than guessing.

use crate::change::{Cause, Change, ChangeError, Changer, IssueDetector, Parameters};
use crate::commit::{CommitHistory, CommitRequest, CommitSummary, HistoryError, Timeline};
use crate::location::Location;
use crate::repository::{InMemoryRepository, Repository, RepositoryError};
use crate::rules::{PatternDetector, Rule, RuleError, TemplateChanger};
use crate::select::{self, NodeSelection, StatementSelection, UnitKind};
use crate::source::{Signature, Source};
use crate::tree::{validate_rewrite, Parser, SyntaxTree, TreeError, TreeSitterParser};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Change(#[from] ChangeError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Mutable state owned by one engine.
#[derive(Debug, Default)]
pub struct EngineState {
    /// Latest parsed revision per file.
    trees: HashMap<Signature, SyntaxTree>,
    /// Issues found in the cached revision per file.
    issues: HashMap<Signature, Vec<Cause>>,
    timeline: Timeline,
    /// Last timestamp handed out, in nanoseconds.
    clock: u128,
}

impl EngineState {
    /// Wall-clock nanoseconds, forced strictly increasing.
    fn next_timestamp(&mut self) -> u128 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);
        self.clock = now.max(self.clock + 1);
        self.clock
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn cached_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Parse `source` unless its exact revision is cached. A cached older
/// revision of the same file is used as the incremental hint and replaced.
fn ensure_tree<'a>(
    parser: &mut dyn Parser,
    trees: &'a mut HashMap<Signature, SyntaxTree>,
    source: &Source,
) -> Result<&'a SyntaxTree, TreeError> {
    let key = source.signature();
    let fresh = match trees.get(&key) {
        Some(tree) if tree.source() == source => None,
        Some(previous) => Some(parser.reparse(previous, source)?),
        None => Some(parser.parse(source)?),
    };
    if let Some(tree) = fresh {
        debug!(source = source.name(), nodes = tree.len(), errors = tree.errors().len(), "parsed");
        trees.insert(key, tree);
    }
    trees.get(&key).ok_or_else(|| TreeError::NoTree {
        source_name: source.name().to_string(),
    })
}

pub struct EngineBuilder {
    parser: Option<Box<dyn Parser>>,
    repository: Option<Box<dyn Repository>>,
    detectors: Vec<Arc<dyn IssueDetector>>,
    changers: Vec<Arc<dyn Changer>>,
    user: String,
    errors: Vec<String>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            parser: None,
            repository: None,
            detectors: Vec::new(),
            changers: Vec::new(),
            user: "refactorer".to_string(),
            errors: Vec::new(),
        }
    }

    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn repository(mut self, repository: impl Repository + 'static) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn detector(mut self, detector: impl IssueDetector + 'static) -> Self {
        self.detectors.push(Arc::new(detector));
        self
    }

    /// Changers are consulted in the order they are added.
    pub fn changer(mut self, changer: impl Changer + 'static) -> Self {
        self.changers.push(Arc::new(changer));
        self
    }

    /// Add a pattern rule: its detector, and its changer when it has a
    /// rewrite. A broken rule is recorded as a wiring error and skipped.
    pub fn rule(mut self, rule: Rule) -> Self {
        match Self::compile_rule(rule) {
            Ok((detector, changer)) => {
                self.detectors.push(Arc::new(detector));
                if let Some(changer) = changer {
                    self.changers.push(Arc::new(changer));
                }
            }
            Err(err) => {
                warn!(error = %err, "rule skipped");
                self.errors.push(err.to_string());
            }
        }
        self
    }

    fn compile_rule(rule: Rule) -> Result<(PatternDetector, Option<TemplateChanger>), RuleError> {
        let changer = TemplateChanger::from_rule(&rule)?;
        Ok((PatternDetector::new(rule)?, changer))
    }

    /// Record a problem found while wiring the engine.
    pub fn wiring_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    /// Finish wiring. Defaults: Java tree-sitter parser, in-memory repository.
    pub fn build(self) -> Result<Engine, EngineError> {
        let parser: Box<dyn Parser> = match self.parser {
            Some(parser) => parser,
            None => Box::new(TreeSitterParser::java()?),
        };
        let repository: Box<dyn Repository> = self
            .repository
            .unwrap_or_else(|| Box::new(InMemoryRepository::new(self.user.clone())));

        debug!(
            detectors = self.detectors.len(),
            changers = self.changers.len(),
            wiring_errors = self.errors.len(),
            "engine built"
        );
        Ok(Engine {
            parser,
            repository,
            detectors: self.detectors,
            changers: self.changers,
            user: self.user,
            wiring_errors: self.errors,
            state: EngineState::default(),
        })
    }
}

pub struct Engine {
    parser: Box<dyn Parser>,
    repository: Box<dyn Repository>,
    detectors: Vec<Arc<dyn IssueDetector>>,
    changers: Vec<Arc<dyn Changer>>,
    user: String,
    wiring_errors: Vec<String>,
    state: EngineState,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Problems recorded while the engine was wired.
    pub fn wiring_errors(&self) -> &[String] {
        &self.wiring_errors
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Start tracking a source: an empty history for its signature and a
    /// parsed tree.
    pub fn register(&mut self, source: &Source) -> Result<&SyntaxTree, EngineError> {
        self.state.timeline.register(source);
        debug!(source = source.name(), signature = %source.signature(), "registered");
        self.tree(source)
    }

    /// Parsed tree of exactly this revision.
    pub fn tree(&mut self, source: &Source) -> Result<&SyntaxTree, EngineError> {
        Ok(ensure_tree(self.parser.as_mut(), &mut self.state.trees, source)?)
    }

    /// Run every detector against `source`, replacing its cached issues.
    pub fn detect(&mut self, source: &Source) -> Result<&[Cause], EngineError> {
        let tree = ensure_tree(self.parser.as_mut(), &mut self.state.trees, source)?;
        let causes: Vec<Cause> = self
            .detectors
            .iter()
            .flat_map(|detector| detector.scan(tree))
            .collect();
        debug!(source = source.name(), issues = causes.len(), "detection finished");

        let cached = self.state.issues.entry(source.signature()).or_default();
        *cached = causes;
        Ok(cached.as_slice())
    }

    /// Issues from the last detection run on this exact revision.
    pub fn issues(&self, source: &Source) -> Vec<&Cause> {
        self.state
            .issues
            .get(&source.signature())
            .map(|causes| causes.iter().filter(|cause| cause.source() == source).collect())
            .unwrap_or_default()
    }

    pub fn select_node(
        &mut self,
        source: &Source,
        selection: &Location,
    ) -> Result<NodeSelection, EngineError> {
        let tree = self.tree(source)?;
        Ok(select::select_node(tree, selection))
    }

    pub fn select_statements(
        &mut self,
        source: &Source,
        selection: &Location,
    ) -> Result<StatementSelection, EngineError> {
        let tree = self.tree(source)?;
        Ok(select::select_statements(tree, selection))
    }

    pub fn locate_units(
        &mut self,
        source: &Source,
        name: &str,
        kind: UnitKind,
    ) -> Result<BTreeSet<Location>, EngineError> {
        let tree = self.tree(source)?;
        Ok(select::locate_units(tree, name, kind))
    }

    /// Hand `cause` to the first changer that accepts it.
    ///
    /// A change whose selection or parameters fail validation is still
    /// returned, carrying its errors; only a missing changer or tree is an
    /// error here.
    pub fn create_change(&mut self, cause: Cause, params: Parameters) -> Result<Change, EngineError> {
        let changer = self
            .changers
            .iter()
            .find(|changer| changer.can_handle(&cause))
            .cloned()
            .ok_or_else(|| ChangeError::NoSuitableChanger {
                cause: cause.to_string(),
            })?;

        let tree = ensure_tree(self.parser.as_mut(), &mut self.state.trees, cause.source())?;
        let selection = cause.selection().map(|location| select::select_statements(tree, location));

        let mut change = Change::new(cause, params, changer);
        if let Some(rejection) = selection.and_then(|selection| selection.rejection) {
            change.reject(rejection.to_string());
        }
        change.validate(tree);

        if !change.is_valid() {
            warn!(
                cause = %change.cause(),
                changer = change.changer_name(),
                errors = ?change.errors(),
                "change rejected"
            );
        }
        Ok(change)
    }

    /// Perform and commit `change`.
    ///
    /// Returns the new revision, or `None` when nothing was committed: the
    /// change was invalid, produced no difference, broke the syntax, or the
    /// repository refused it. Reasons are logged and left on the change.
    pub fn apply(&mut self, change: &mut Change) -> Option<Source> {
        let before = change.cause().source().clone();
        let head = self
            .state
            .timeline
            .history(before.signature())
            .and_then(CommitHistory::last);
        if head.is_some_and(|head| head.after() != &before) {
            let err = ChangeError::StaleTree {
                source_name: before.name().to_string(),
            };
            warn!(source = before.name(), error = %err, "change targets a superseded revision");
            change.mark_failed(err.to_string());
            return None;
        }

        let tree = match ensure_tree(self.parser.as_mut(), &mut self.state.trees, &before) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(source = before.name(), error = %err, "no tree for change");
                change.mark_failed(err.to_string());
                return None;
            }
        };

        let delta = match change.perform(tree) {
            Ok(deltas) => deltas.iter().find(|delta| delta.source() == &before).cloned(),
            Err(err) => {
                warn!(source = before.name(), error = %err, "change not performed");
                return None;
            }
        }?;

        let next_tree = if delta.is_noop() {
            None
        } else {
            match validate_rewrite(self.parser.as_mut(), tree, &delta.after) {
                Ok(next_tree) => Some(next_tree),
                Err(err) => {
                    warn!(source = before.name(), error = %err, "rewrite rejected");
                    change.mark_failed(err.to_string());
                    return None;
                }
            }
        };

        let timestamp = self.state.next_timestamp();
        let commit = CommitRequest::new(
            change.cause().name().to_string(),
            delta.before.clone(),
            delta.after.clone(),
        )
        .commit(self.repository.as_mut(), timestamp);

        match commit.summary() {
            CommitSummary::Success { .. } => {}
            CommitSummary::Canceled { reason } => {
                info!(source = before.name(), %reason, "nothing to commit");
                return None;
            }
            CommitSummary::Failure { reason } => {
                change.mark_failed(reason.clone());
                return None;
            }
            CommitSummary::Pending => {
                change.mark_failed("repository left the commit pending");
                return None;
            }
        }

        self.state.timeline.register(&before);
        if let Err(err) = self.state.timeline.record(commit) {
            warn!(source = before.name(), error = %err, "commit not recorded");
            change.mark_failed(err.to_string());
            return None;
        }
        change.mark_committed();

        // The before-revision is committed past: its tree and issues go.
        let key = before.signature();
        self.state.issues.remove(&key);
        if let Some(next_tree) = next_tree {
            self.state.trees.insert(key, next_tree);
        }
        if let Err(err) = self.detect(&delta.after) {
            warn!(source = before.name(), error = %err, "detection after commit failed");
        }

        info!(source = before.name(), cause = %change.cause(), "change applied");
        Some(delta.after)
    }

    pub fn advance(&self, current: &Source) -> Source {
        self.state.timeline.advance(current)
    }

    pub fn regress(&self, current: &Source) -> Source {
        self.state.timeline.regress(current)
    }

    /// Truncate the history of `source`'s file at `source`. Irreversible.
    pub fn rewrite_history(&mut self, source: &Source) -> Result<(), EngineError> {
        self.state.timeline.rewrite(source)?;
        Ok(())
    }

    pub fn history(&self, source: &Source) -> Option<&CommitHistory> {
        self.state.timeline.history(source.signature())
    }

    /// Revisions the repository holds for `id`, oldest first.
    pub fn pull(&self, id: &str) -> Result<Vec<Source>, EngineError> {
        Ok(self.repository.pull(id)?)
    }
}
