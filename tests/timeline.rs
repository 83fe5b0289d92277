//! History navigation through the engine: advance, regress and rewrite.

use refactorer::change::Rewrite;
use refactorer::{
    Cause, CauseName, ChangeError, Changer, CommitSummary, Engine, EngineError, HistoryError,
    Parameters, Source, SyntaxTree,
};

/// Replaces every occurrence of the `from` parameter with `to`.
struct Replace;

impl Changer for Replace {
    fn name(&self) -> &str {
        "replace"
    }

    fn can_handle(&self, cause: &Cause) -> bool {
        cause.detector().is_none() && cause.name().what == "replace"
    }

    fn check(&self, _cause: &Cause, _tree: &SyntaxTree, params: &Parameters) -> Vec<String> {
        ["from", "to"]
            .iter()
            .filter(|key| !params.contains_key(**key))
            .map(|key| format!("missing parameter '{key}'"))
            .collect()
    }

    fn rewrite(
        &self,
        cause: &Cause,
        _tree: &SyntaxTree,
        params: &Parameters,
    ) -> Result<Rewrite, ChangeError> {
        let from = &params["from"];
        let to = &params["to"];
        Ok(Rewrite::Text(cause.source().contents().replace(from.as_str(), to)))
    }
}

fn engine() -> Engine {
    Engine::builder().user("ana").changer(Replace).build().unwrap()
}

fn replace(engine: &mut Engine, source: &Source, from: &str, to: &str) -> Option<Source> {
    let cause = Cause::edit(CauseName::new("replace", "test"), source, None, "");
    let params = Parameters::from([
        ("from".to_string(), from.to_string()),
        ("to".to_string(), to.to_string()),
    ]);
    let mut change = engine.create_change(cause, params).unwrap();
    assert!(change.is_valid(), "{:?}", change.errors());
    engine.apply(&mut change)
}

/// S0 -> S1 -> S2, renaming a local twice.
fn two_commits(engine: &mut Engine) -> (Source, Source, Source) {
    let s0 = Source::new("A.java", "class A { void m() { int a = 1; } }\n");
    engine.register(&s0).unwrap();
    let s1 = replace(engine, &s0, "int a", "int b").unwrap();
    let s2 = replace(engine, &s1, "int b", "int c").unwrap();
    (s0, s1, s2)
}

#[test]
fn regress_walks_back_to_the_original() {
    let mut engine = engine();
    let (s0, s1, s2) = two_commits(&mut engine);

    assert_eq!(engine.regress(&s2), s1);
    assert_eq!(engine.regress(&s1), s0);
    assert_eq!(engine.regress(&s0), s0);
}

#[test]
fn advance_walks_forward_to_the_head() {
    let mut engine = engine();
    let (s0, s1, s2) = two_commits(&mut engine);

    assert_eq!(engine.advance(&s0), s1);
    assert_eq!(engine.advance(&s1), s2);
    assert_eq!(engine.advance(&s2), s2);
    assert_eq!(engine.regress(&engine.advance(&s1)), s1);
}

#[test]
fn rewrite_truncates_future() {
    let mut engine = engine();
    let (s0, s1, s2) = two_commits(&mut engine);

    engine.rewrite_history(&s1).unwrap();
    let history = engine.history(&s0).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.last().unwrap().after(), &s1);
    assert_eq!(engine.advance(&s1), s1);
    assert_eq!(engine.regress(&s1), s0);
    assert!(!history.contains(&s2));
}

#[test]
fn rewrite_to_original_empties_history() {
    let mut engine = engine();
    let (s0, _, s2) = two_commits(&mut engine);

    engine.rewrite_history(&s0).unwrap();
    assert!(engine.history(&s0).unwrap().is_empty());
    assert_eq!(engine.regress(&s2), s2);
}

#[test]
fn rewrite_to_unknown_revision_fails() {
    let mut engine = engine();
    let (s0, _, _) = two_commits(&mut engine);

    let stranger = s0.revise("class A {}\n");
    let err = engine.rewrite_history(&stranger).unwrap_err();
    assert!(matches!(err, EngineError::History(HistoryError::NotFound { .. })));
    assert_eq!(engine.history(&s0).unwrap().len(), 2);
}

#[test]
fn commits_are_ordered_and_summarized() {
    let mut engine = engine();
    let (s0, s1, s2) = two_commits(&mut engine);

    let history = engine.history(&s2).unwrap();
    let commits: Vec<_> = history.iter().collect();
    assert!(commits[0] < commits[1]);
    assert!(commits[0].timestamp() < commits[1].timestamp());
    assert_eq!(commits[0].before(), &s0);
    assert_eq!(commits[1].before(), &s1);
    for commit in commits {
        assert!(commit.summary().is_success());
        let CommitSummary::Success { user, message, .. } = commit.summary() else {
            unreachable!();
        };
        assert_eq!(user, "ana");
        assert_eq!(message, "replace (test)");
    }
}

#[test]
fn noop_change_is_not_committed() {
    let mut engine = engine();
    let (_, _, s2) = two_commits(&mut engine);

    assert!(replace(&mut engine, &s2, "missing", "other").is_none());
    assert_eq!(engine.history(&s2).unwrap().len(), 2);
}

#[test]
fn histories_are_per_file() {
    let mut engine = engine();
    let (s0, _, _) = two_commits(&mut engine);
    let other = Source::new("B.java", "class B { int a; }\n");
    engine.register(&other).unwrap();

    let revised = replace(&mut engine, &other, "int a", "int z").unwrap();
    assert_eq!(engine.history(&other).unwrap().len(), 1);
    assert_eq!(engine.history(&s0).unwrap().len(), 2);
    assert_eq!(engine.regress(&revised), other);
}

#[test]
fn repository_receives_every_revision() {
    let mut engine = engine();
    let (s0, s1, s2) = two_commits(&mut engine);

    assert_eq!(engine.pull("A.java").unwrap(), vec![s0, s1, s2]);
}
