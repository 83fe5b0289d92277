//! Loading engine configuration from disk and wiring an engine from it.

use refactorer::config::{load_from_path, ConfigError, Origin, RepositoryKind, ValidationIssue};
use refactorer::{Parameters, Source};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[engine]
language = "java"
user = "ana"

[repository]
kind = "local"
root = "src"

[[rules]]
id = "null-unsafe-equals"
description = "equals on a possibly null receiver"
pattern = "$L.equals($R)"
rewrite = "java.util.Objects.equals($L, $R)"

[[rules]]
id = "print"
description = "console output"
pattern = "System.out.println($X)"
"#;

/// A workspace with a config file and `src/Names.java`.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("refactorer.toml"), CONFIG).unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/Names.java"),
        "class Names {\n    boolean same(String a, String b) {\n        System.out.println(a);\n        return a.equals(b);\n    }\n}\n",
    )
    .unwrap();
    dir
}

#[test]
fn load_config_from_path() {
    let dir = setup_workspace();
    let config = load_from_path(dir.path().join("refactorer.toml")).unwrap();

    assert_eq!(config.engine.user, "ana");
    assert_eq!(config.repository.kind, RepositoryKind::Local);
    assert_eq!(config.rules.len(), 2);
    assert!(config.rules[1].rewrite.is_none());
    assert_eq!(config.repository_root(), dir.path().join("src"));
}

#[test]
fn configured_engine_fixes_file_on_disk() {
    let dir = setup_workspace();
    let config = load_from_path(dir.path().join("refactorer.toml")).unwrap();
    let mut engine = config.build().unwrap();
    assert!(engine.wiring_errors().is_empty());
    assert_eq!(engine.user(), "ana");

    let path = dir.path().join("src/Names.java");
    let s0 = Source::new("Names.java", fs::read_to_string(&path).unwrap());
    let issues = engine.detect(&s0).unwrap().to_vec();
    assert_eq!(issues.len(), 2);

    // Only the equals rule has a rewrite.
    let print = issues
        .iter()
        .find(|issue| issue.detector() == Some("print"))
        .unwrap();
    assert!(engine.create_change(print.clone(), Parameters::new()).is_err());

    let equals = issues
        .iter()
        .find(|issue| issue.detector() == Some("null-unsafe-equals"))
        .unwrap();
    let mut change = engine.create_change(equals.clone(), Parameters::new()).unwrap();
    let s1 = engine.apply(&mut change).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), s1.contents());
    assert!(s1.contents().contains("return java.util.Objects.equals(a, b);"));
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = load_from_path(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_file_reports_path_and_issues() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[repository]\nkind = \"local\"\n\n[[rules]]\nid = \"x\"\npattern = \"\"\n",
    )
    .unwrap();

    let err = load_from_path(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bad.toml"), "{message}");
    assert_eq!(err.origin(), Origin::File(path.clone()));
    let ConfigError::Invalid { source, .. } = err else {
        panic!("expected validation error");
    };
    assert_eq!(
        source.issues,
        vec![
            ValidationIssue::InvalidCombo {
                rule_id: None,
                message: "local repository requires repository.root".into(),
            },
            ValidationIssue::MissingField {
                rule_id: Some("x".into()),
                field: "pattern",
            },
        ]
    );
}

#[test]
fn unknown_repository_kind_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kind.toml");
    fs::write(&path, "[repository]\nkind = \"ftp\"\n").unwrap();

    assert!(matches!(
        load_from_path(&path),
        Err(ConfigError::Parse {
            origin: Origin::File(_),
            ..
        })
    ));
}

#[test]
fn local_root_must_exist_next_to_the_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refactorer.toml");
    fs::write(&path, "[repository]\nkind = \"local\"\nroot = \"missing\"\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    let ConfigError::MissingRoot { root, .. } = &err else {
        panic!("expected missing root, got {err}");
    };
    assert_eq!(root, &dir.path().join("missing"));
    assert!(err.to_string().contains("refactorer.toml"));
}

#[test]
fn config_in_subdirectory_resolves_root_from_there() {
    let dir = setup_workspace();
    let nested = dir.path().join("conf");
    fs::create_dir(&nested).unwrap();
    fs::create_dir(nested.join("src")).unwrap();
    fs::write(nested.join("refactorer.toml"), CONFIG).unwrap();

    let config = load_from_path(nested.join("refactorer.toml")).unwrap();
    assert_eq!(config.base_dir(), nested.as_path());
    assert_eq!(config.repository_root(), nested.join("src"));
}
