use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Top-level directories under a repository root that documents never live in.
const EXCLUDED: [&str; 2] = [".git", "target"];

/// Maps document names to files under a local repository root.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical repository root
    workspace_root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("document {name} resolves outside repository root {root}")]
    Escapes { name: String, root: PathBuf },

    #[error("document {name} lies under excluded directory {dir}")]
    Excluded { name: String, dir: &'static str },

    #[error("cannot resolve document path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Guard `workspace_root`, which must exist.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            workspace_root: workspace_root.as_ref().canonicalize()?,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Resolve a document name to a writable path under the root.
    ///
    /// The file need not exist yet, but its directory must. Existing files
    /// are followed through symlinks before the check; `..` is never allowed.
    pub fn resolve(&self, name: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let name = name.as_ref();
        let escapes = || SafetyError::Escapes {
            name: name.display().to_string(),
            root: self.workspace_root.clone(),
        };
        if name
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(escapes());
        }

        let joined = self.workspace_root.join(name);
        let resolved = if joined.exists() {
            joined.canonicalize()?
        } else {
            let file_name = joined.file_name().ok_or_else(escapes)?;
            let parent = joined.parent().unwrap_or(self.workspace_root.as_path());
            parent.canonicalize()?.join(file_name)
        };

        let relative = resolved
            .strip_prefix(&self.workspace_root)
            .map_err(|_| escapes())?;
        if let Some(Component::Normal(first)) = relative.components().next() {
            if let Some(dir) = EXCLUDED.iter().find(|dir| first.to_str() == Some(**dir)) {
                return Err(SafetyError::Excluded {
                    name: name.display().to_string(),
                    dir: *dir,
                });
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn new_document_resolves_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(dir.path()).unwrap();

        let resolved = guard.resolve("Main.java").unwrap();
        assert_eq!(resolved, guard.workspace_root().join("Main.java"));
    }

    #[test]
    fn nested_document_needs_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(dir.path()).unwrap();

        assert!(matches!(
            guard.resolve("pkg/Main.java"),
            Err(SafetyError::Canonicalize(_))
        ));
        fs::create_dir(dir.path().join("pkg")).unwrap();
        assert!(guard.resolve("pkg/Main.java").is_ok());
    }

    #[test]
    fn escaping_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir(&root).unwrap();
        let outside = dir.path().join("Outside.java");
        fs::write(&outside, "").unwrap();
        let guard = WorkspaceGuard::new(&root).unwrap();

        assert!(matches!(
            guard.resolve("../Outside.java"),
            Err(SafetyError::Escapes { .. })
        ));
        // An absolute name replaces the root when joined.
        assert!(matches!(
            guard.resolve(&outside),
            Err(SafetyError::Escapes { .. })
        ));
    }

    #[test]
    fn build_and_vcs_directories_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let guard = WorkspaceGuard::new(dir.path()).unwrap();

        assert!(matches!(
            guard.resolve(".git/config"),
            Err(SafetyError::Excluded { dir: ".git", .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_out_of_root_is_refused() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir(&root).unwrap();
        let outside = dir.path().join("Outside.java");
        fs::write(&outside, "").unwrap();
        symlink(&outside, root.join("Link.java")).unwrap();

        let guard = WorkspaceGuard::new(&root).unwrap();
        assert!(matches!(
            guard.resolve("Link.java"),
            Err(SafetyError::Escapes { .. })
        ));
    }
}
