//! Selection resolution through the engine: single nodes, statement runs and
//! declarations by name.

use refactorer::{Engine, Location, NodeKind, SelectionRejection, Source, UnitKind};

const COUNTER: &str = r#"class Counter {
    private int total;
    private final int[] limits = {1, 2, 3};

    void add(int amount) {
        total = total + amount;
        for (int i = 0; i < amount; i++) {
            total++;
        }
        synchronized (this) {
            total--;
        }
        switch (amount) {
            case 1:
                total = 0;
                break;
            default:
                total = 1;
        }
        try {
            total = total / amount;
        } catch (ArithmeticException e) {
            total = 0;
        }
    }

    int add(int amount, int times) {
        return amount * times;
    }

    static class Inner {
        int total() { return 0; }
    }
}
"#;

fn source() -> Source {
    Source::new("Counter.java", COUNTER)
}

/// From the first occurrence of `from` through the end of the next `to`.
fn between(source: &Source, from: &str, to: &str) -> Location {
    let text = source.contents();
    let start = text.find(from).unwrap();
    let end = text[start..].find(to).unwrap() + start + to.len();
    source.location(start..end)
}

fn nth(source: &Source, needle: &str, n: usize) -> Location {
    let start = source.contents().match_indices(needle).nth(n).unwrap().0;
    source.location(start..start + needle.len())
}

#[test]
fn identifier_in_method_body_matches_identifier() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    // second `total` of `total = total + amount;`
    let selection = nth(&source, "total", 2);

    let result = engine.select_node(&source, &selection).unwrap();
    let tree = engine.tree(&source).unwrap();
    let matched = result.matched.unwrap();
    assert_eq!(tree.node(matched).kind, NodeKind::Identifier);
    assert_eq!(tree.text(matched), "total");
    assert_ne!(tree.node(tree.parent(matched).unwrap()).kind, NodeKind::Block);
}

#[test]
fn resolving_twice_gives_same_node() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    let selection = between(&source, "total = total", "amount;");

    let first = engine.select_node(&source, &selection).unwrap();
    let second = engine.select_node(&source, &selection).unwrap();
    assert_eq!(first, second);
    assert!(first.matched.is_some());
}

#[test]
fn loop_guard_and_body_without_initializer_is_rejected() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    let selection = between(&source, "i < amount", "total++;\n        }");

    let result = engine.select_statements(&source, &selection).unwrap();
    assert!(!result.covers_valid_statements());
    assert_eq!(result.rejection, Some(SelectionRejection::LoopBoundary));
}

#[test]
fn whole_loop_is_a_valid_run() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    let selection = between(&source, "for (", "total++;\n        }");

    let result = engine.select_statements(&source, &selection).unwrap();
    assert!(result.covers_valid_statements(), "{:?}", result.rejection);
    let tree = engine.tree(&source).unwrap();
    assert_eq!(result.nodes.len(), 1);
    assert_eq!(tree.node(result.nodes[0]).kind, NodeKind::ForLoop);
}

#[test]
fn several_statements_form_one_run() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    let selection = between(&source, "total = total + amount;", "total--;\n        }");

    let result = engine.select_statements(&source, &selection).unwrap();
    assert!(result.covers_valid_statements(), "{:?}", result.rejection);
    assert_eq!(result.nodes.len(), 3);
}

#[test]
fn structural_rejections() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();
    let cases = [
        (between(&source, "{1, 2", "3}"), SelectionRejection::ArrayInitializer),
        (between(&source, "case 1:", "total = 0;"), SelectionRejection::CaseLabel),
        (between(&source, "{\n            total--", "}"), SelectionRejection::MonitorBody),
        (
            between(&source, "catch (", "total = 0;\n        }"),
            SelectionRejection::TryBoundary,
        ),
        (between(&source, "total = total", "+"), SelectionRejection::Straddles),
    ];

    for (selection, expected) in cases {
        let result = engine.select_statements(&source, &selection).unwrap();
        assert_eq!(result.rejection, Some(expected), "selection {selection}");
    }
}

const BOUNDARIES: &str = r#"class Boundaries {
    void run(int n) {
        try { a(); } catch (Exception e) { b(); } finally { c(); }
        do { n -= 2; } while (n > 1);
        while (n > 0) { n--; }
    }
}
"#;

#[test]
fn try_and_loop_parts_are_rejected() {
    let mut engine = Engine::builder().build().unwrap();
    let source = Source::new("Boundaries.java", BOUNDARIES);
    let cases = [
        (between(&source, "{ a();", "a(); }"), SelectionRejection::TryBoundary),
        (between(&source, "{ c();", "c(); }"), SelectionRejection::TryBoundary),
        (
            between(&source, "Exception e", "Exception e"),
            SelectionRejection::TryBoundary,
        ),
        (between(&source, "{ n -= 2;", "(n > 1)"), SelectionRejection::LoopBoundary),
        (between(&source, "(n > 0)", "n--; }"), SelectionRejection::LoopBoundary),
    ];

    for (selection, expected) in cases {
        let result = engine.select_statements(&source, &selection).unwrap();
        assert_eq!(result.rejection, Some(expected), "selection {selection}");
    }

    // The whole construct is fine.
    let whole = between(&source, "try {", "c(); }");
    let result = engine.select_statements(&source, &whole).unwrap();
    assert!(result.covers_valid_statements(), "{:?}", result.rejection);
}

#[test]
fn locate_overloaded_methods() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();

    let methods = engine.locate_units(&source, "add", UnitKind::Method).unwrap();
    assert_eq!(methods.len(), 2);
    let lines: Vec<i64> = methods.iter().map(|location| location.start.line).collect();
    assert!(lines.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn locate_distinguishes_kinds() {
    let mut engine = Engine::builder().build().unwrap();
    let source = source();

    assert_eq!(engine.locate_units(&source, "total", UnitKind::Field).unwrap().len(), 1);
    assert_eq!(engine.locate_units(&source, "total", UnitKind::Method).unwrap().len(), 1);
    assert_eq!(engine.locate_units(&source, "amount", UnitKind::Parameter).unwrap().len(), 2);
    assert_eq!(engine.locate_units(&source, "Inner", UnitKind::InnerClass).unwrap().len(), 1);
    assert!(engine.locate_units(&source, "Counter", UnitKind::InnerClass).unwrap().is_empty());
    assert!(engine.locate_units(&source, "tot", UnitKind::Field).unwrap().is_empty());
}
