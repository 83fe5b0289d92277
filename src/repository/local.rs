use crate::commit::{Commit, CommitSummary};
use crate::repository::errors::RepositoryError;
use crate::repository::guard::WorkspaceGuard;
use crate::repository::Repository;
use crate::source::Source;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

/// Writes committed revisions to files under a root directory.
///
/// A push only goes through if the file on disk still holds the commit's
/// before-text (or does not exist yet), so edits made behind the engine's
/// back are never overwritten.
#[derive(Debug)]
pub struct LocalRepository {
    guard: WorkspaceGuard,
    user: String,
    revisions: HashMap<String, Vec<Source>>,
}

impl LocalRepository {
    pub fn open(root: impl AsRef<Path>, user: impl Into<String>) -> Result<Self, RepositoryError> {
        Ok(Self {
            guard: WorkspaceGuard::new(root)?,
            user: user.into(),
            revisions: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.guard.workspace_root()
    }

    /// Read a document under the root as a fresh source.
    pub fn load(&self, name: &str) -> Result<Source, RepositoryError> {
        let path = self.guard.resolve(name)?;
        let contents = fs::read_to_string(&path)?;
        Ok(Source::new(name, contents))
    }

    fn path_for(&self, source: &Source) -> Result<PathBuf, RepositoryError> {
        Ok(self.guard.resolve(source.repository_id())?)
    }
}

impl Repository for LocalRepository {
    fn push(&mut self, commit: &Commit) -> Result<CommitSummary, RepositoryError> {
        let path = self.path_for(commit.before())?;

        if path.exists() {
            let on_disk = fs::read_to_string(&path)?;
            if on_disk != commit.before().contents() {
                return Err(RepositoryError::Rejected {
                    reason: format!("{} changed on disk since it was loaded", path.display()),
                });
            }
        }

        atomic_write(&path, commit.after().contents().as_bytes())?;
        filetime::set_file_mtime(&path, filetime::FileTime::now())?;

        let id = commit.before().repository_id().to_string();
        let log = self.revisions.entry(id).or_default();
        if log.last() != Some(commit.before()) {
            log.push(commit.before().clone());
        }
        log.push(commit.after().clone());

        info!(path = %path.display(), bytes = commit.after().contents().len(), "revision written");
        Ok(CommitSummary::Success {
            id: format!("{:016x}", xxh3_64(commit.after().contents().as_bytes())),
            user: self.user.clone(),
            timestamp: commit.timestamp(),
            url: Some(format!("file://{}", path.display())),
            message: commit.name().to_string(),
        })
    }

    /// Revisions written in this session; the file's current text when the
    /// session has written none.
    fn pull(&self, id: &str) -> Result<Vec<Source>, RepositoryError> {
        if let Some(log) = self.revisions.get(id) {
            return Ok(log.clone());
        }
        let path = self.guard.resolve(id)?;
        if !path.exists() {
            return Err(RepositoryError::NotFound { id: id.to_string() });
        }
        debug!(id, "pulling from disk");
        Ok(vec![Source::new(id, fs::read_to_string(&path)?)])
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
