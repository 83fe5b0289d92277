use crate::config::schema::{EngineConfig, RepositoryKind, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => f.write_str("<inline>"),
            Origin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: Origin,
        source: toml_edit::de::Error,
    },
    Invalid {
        origin: Origin,
        source: ValidationError,
    },
    /// `repository.root` does not name a directory next to the config file.
    MissingRoot { origin: Origin, root: PathBuf },
}

impl ConfigError {
    pub fn origin(&self) -> Origin {
        match self {
            ConfigError::Read { path, .. } => Origin::File(path.clone()),
            ConfigError::Parse { origin, .. }
            | ConfigError::Invalid { origin, .. }
            | ConfigError::MissingRoot { origin, .. } => origin.clone(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read engine config {}: {}", path.display(), source)
            }
            ConfigError::Parse { origin, source } => {
                write!(f, "{origin}: malformed engine config: {source}")
            }
            ConfigError::Invalid { origin, source } => write!(f, "{origin}: {source}"),
            ConfigError::MissingRoot { origin, root } => write!(
                f,
                "{origin}: repository root {} is not a directory",
                root.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { source, .. } => Some(source),
            ConfigError::MissingRoot { .. } => None,
        }
    }
}

fn parse(input: &str, origin: &Origin) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Parse {
            origin: origin.clone(),
            source,
        })?;
    config.validate().map_err(|source| ConfigError::Invalid {
        origin: origin.clone(),
        source,
    })?;
    Ok(config)
}

/// Parse and validate a config held in memory. Relative paths in it resolve
/// against the working directory.
pub fn load_from_str(input: &str) -> Result<EngineConfig, ConfigError> {
    parse(input, &Origin::Inline)
}

/// Read a config file. Its directory becomes the base for
/// `repository.root`, and a local root must already exist there.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = Origin::File(path.to_path_buf());
    let base_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let config = parse(&contents, &origin)?.with_base_dir(base_dir);
    if config.repository.kind == RepositoryKind::Local {
        let root = config.repository_root();
        if !root.is_dir() {
            return Err(ConfigError::MissingRoot { origin, root });
        }
    }
    debug!(path = %path.display(), rules = config.rules.len(), "engine config loaded");
    Ok(config)
}
