use crate::rules::Rule;
use crate::tree::{language_from_name, SupportLang};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub repository: RepositorySection,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Directory relative paths resolve against; the working directory when
    /// unset.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.engine.language.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule_id: None,
                field: "engine.language",
            });
        } else if language_from_name(&self.engine.language).is_none() {
            issues.push(ValidationIssue::UnknownLanguage {
                name: self.engine.language.clone(),
            });
        }

        if self.repository.kind == RepositoryKind::Local
            && self.repository.root.as_deref().unwrap_or("").trim().is_empty()
        {
            issues.push(ValidationIssue::InvalidCombo {
                rule_id: None,
                message: "local repository requires repository.root".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateRuleId {
                    rule_id: rule.id.clone(),
                });
            }
            if rule.pattern.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "pattern",
                });
            }
            if rule.rewrite.as_deref().is_some_and(|rewrite| rewrite.trim().is_empty()) {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: Some(rule.id.clone()),
                    message: "rewrite is present but empty".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// `repository.root` resolved against the base directory.
    pub fn repository_root(&self) -> PathBuf {
        self.base_dir()
            .join(self.repository.root.as_deref().unwrap_or("."))
    }

    /// Configured language; Java when the name is not recognised.
    pub fn lang(&self) -> SupportLang {
        language_from_name(&self.engine.language).unwrap_or(SupportLang::Java)
    }

    pub fn rules(&self) -> Vec<Rule> {
        let lang = self.lang();
        self.rules
            .iter()
            .map(|definition| Rule {
                id: definition.id.clone(),
                description: definition.description.clone(),
                pattern: definition.pattern.clone(),
                rewrite: definition.rewrite.clone(),
                lang,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_user")]
    pub user: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            language: default_language(),
            user: default_user(),
        }
    }
}

fn default_language() -> String {
    "java".to_string()
}

fn default_user() -> String {
    "refactorer".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RepositorySection {
    #[serde(default)]
    pub kind: RepositoryKind,
    /// Directory of a local repository, relative to the config file.
    #[serde(default)]
    pub root: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RepositoryKind {
    #[default]
    Memory,
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub pattern: String,
    #[serde(default)]
    pub rewrite: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateRuleId {
        rule_id: String,
    },
    UnknownLanguage {
        name: String,
    },
    InvalidCombo {
        rule_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::DuplicateRuleId { rule_id } => {
                write!(f, "rule id '{rule_id}' is used more than once")
            }
            ValidationIssue::UnknownLanguage { name } => write!(f, "unknown language '{name}'"),
            ValidationIssue::InvalidCombo { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid configuration: {message}"),
            },
        }
    }
}
