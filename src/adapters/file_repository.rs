//! File-backed policy repository.
//!
//! Each store lives in `<root>/<policy id>`. Saves go through a temporary file
//! in the same directory that is then renamed over the target, so a failed
//! flush never leaves a truncated policy file behind.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{Result, error::Error, identifiers::PolicyId, ports::PolicyRepository};

/// Policy repository writing plain text files.
///
/// # Examples
///
/// ```no_run
/// use empower::adapters::FilePolicyRepository;
/// use empower::identifiers::PolicyId;
/// use empower::ports::PolicyRepository;
///
/// let repo = FilePolicyRepository::new(".");
/// let id = PolicyId::from_names("blocks", "p01");
/// repo.save(&id, "Q-Learning\n0\n-1\n---\n---\n")?;
/// assert!(repo.path_for(&id).exists());
/// # Ok::<(), empower::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilePolicyRepository {
    root: PathBuf,
}

impl FilePolicyRepository {
    /// Repository storing policy files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the policy file for `id`.
    pub fn path_for(&self, id: &PolicyId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

impl Default for FilePolicyRepository {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PolicyRepository for FilePolicyRepository {
    fn load(&self, id: &PolicyId) -> Result<Option<String>> {
        let path = self.path_for(id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Io {
                operation: format!("read policy file {path:?}"),
                source,
            }),
        }
    }

    fn save(&self, id: &PolicyId, text: &str) -> Result<()> {
        let path = self.path_for(id);
        fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            operation: format!("create policy directory {:?}", self.root),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(&self.root).map_err(|source| Error::Io {
            operation: format!("create temporary file in {:?}", self.root),
            source,
        })?;
        temp.write_all(text.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|source| Error::Io {
                operation: format!("write policy file {path:?}"),
                source,
            })?;
        temp.persist(&path).map_err(|err| Error::Io {
            operation: format!("replace policy file {path:?}"),
            source: err.error,
        })?;
        Ok(())
    }
}
