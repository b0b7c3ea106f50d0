//! Single entry point over one repository root.

use crate::core::commit::CommitManager;
use crate::core::config::{PushOptions, RemoteTarget};
use crate::core::dirs::RepoLayout;
use crate::core::error::{Result, VcsError};
use crate::core::metadata::MetadataStore;
use crate::core::object_store::ObjectStore;
use crate::core::staging::StagingManager;
use crate::core::state::{RepositoryMetadata, StagingEntry};
use crate::core::sync::{PushReport, SyncManager};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Repository {
    layout: RepoLayout,
    staging: StagingManager,
    commits: CommitManager,
    sync: SyncManager,
}

impl Repository {
    /// Open the repository rooted at the existing directory `root`.
    /// `.repoMeta` is created by the first mutation.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            log::error!("Repository root {} is not a directory", root.display());
            return Err(VcsError::not_found(&root));
        }

        // Stored paths must not depend on the working directory of the caller.
        let root = fs::canonicalize(&root).map_err(|e| VcsError::unreadable(&root, e))?;
        log::debug!("Opening repository at {}", root.display());
        let layout = RepoLayout::new(root);
        Ok(Self {
            staging: StagingManager::new(layout.clone()),
            commits: CommitManager::new(layout.clone()),
            sync: SyncManager::new(layout.clone()),
            layout,
        })
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn stage(&self, path: impl AsRef<Path>) -> Result<StagingEntry> {
        self.staging.stage(path)
    }

    pub fn commit(&self, message: &str) -> Result<String> {
        self.commits.commit(message)
    }

    pub fn push(&self, target: &RemoteTarget, options: &PushOptions) -> Result<PushReport> {
        self.sync.push(target, options)
    }

    pub fn push_to(
        &self,
        mirror_dir: &Path,
        store: Option<&dyn ObjectStore>,
        options: &PushOptions,
    ) -> Result<PushReport> {
        self.sync.push_to(mirror_dir, store, options)
    }

    /// Current staging set and commit history, read without taking the lock.
    pub fn metadata(&self) -> Result<RepositoryMetadata> {
        MetadataStore::new(&self.layout).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object_store::MemoryObjectStore;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = Repository::open(temp.path().join("nope"));
        assert!(matches!(result, Err(VcsError::NotFound { .. })));
    }

    #[test]
    fn test_open_does_not_create_meta_dir() -> Result<()> {
        let temp = TempDir::new()?;
        let repo = Repository::open(temp.path())?;
        assert!(!repo.layout().meta_dir().exists());
        assert!(repo.metadata()?.commits.is_empty());
        Ok(())
    }

    #[test]
    fn test_relative_root_is_made_absolute() -> Result<()> {
        let temp = TempDir::new()?;
        let repo = Repository::open(temp.path().join("."))?;

        assert!(repo.layout().root().is_absolute());
        assert_eq!(repo.layout().root(), fs::canonicalize(temp.path())?);
        Ok(())
    }

    #[test]
    fn test_stage_commit_push_round() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("repo");
        std::fs::create_dir(&root)?;
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "0123456789")?;

        let repo = Repository::open(&root)?;
        let entry = repo.stage(&source)?;
        assert_eq!(entry.size, 10);

        let id = repo.commit("first")?;
        let metadata = repo.metadata()?;
        assert!(metadata.staged.is_empty());
        assert_eq!(metadata.latest_commit().map(|c| c.id.as_str()), Some(id.as_str()));

        let store = MemoryObjectStore::new();
        let mirror = repo.layout().remote_dir();
        let report = repo.push_to(&mirror, Some(&store), &PushOptions::default())?;

        assert!(report.is_complete());
        assert_eq!(std::fs::read(mirror.join(&id).join("notes.txt"))?, b"0123456789");
        assert!(store.objects().contains_key(&format!("commits/{id}/notes.txt")));
        Ok(())
    }
}
