//! Commits: immutable snapshots of the staging set.
//!
//! A commit copies every staged file into `commits/<id>/`, appends a
//! [`CommitRecord`] and empties the staging set, all while holding the
//! repository lock. The metadata write is the last step: if any copy fails,
//! the record is not appended and staging is left as it was, so the commit
//! can simply be retried (under a new id).

use crate::core::dirs::{ensure_dir, RepoLayout};
use crate::core::error::{Result, VcsError};
use crate::core::ids::generate_commit_id;
use crate::core::lock::{MetadataLock, DEFAULT_LOCK_TIMEOUT};
use crate::core::metadata::MetadataStore;
use crate::core::state::{CommitRecord, CommittedFile};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Attempts at finding an unused commit directory name.
const MAX_ID_ATTEMPTS: usize = 8;

pub struct CommitManager {
    layout: RepoLayout,
    metadata: MetadataStore,
}

impl CommitManager {
    pub fn new(layout: RepoLayout) -> Self {
        let metadata = MetadataStore::new(&layout);
        Self { layout, metadata }
    }

    /// Snapshot everything staged under `message` and return the new commit id.
    pub fn commit(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(VcsError::EmptyMessage);
        }

        let lock = MetadataLock::acquire(&self.layout, DEFAULT_LOCK_TIMEOUT)?;
        let mut metadata = self.metadata.load()?;
        if metadata.staged.is_empty() {
            return Err(VcsError::NothingStaged);
        }

        let (id, commit_dir) = self.create_commit_dir()?;
        log::debug!("Created commit directory {}", commit_dir.display());

        let mut files = Vec::with_capacity(metadata.staged.len());
        for entry in &metadata.staged {
            let dest = commit_dir.join(&entry.filename);
            fs::copy(&entry.staged_path, &dest).map_err(|e| {
                log::error!(
                    "Commit {id} aborted: failed to copy '{}': {e}",
                    entry.staged_path.display()
                );
                VcsError::copy_failed(&entry.staged_path, &dest, e)
            })?;
            files.push(CommittedFile {
                entry: entry.clone(),
                committed_path: dest,
            });
        }

        metadata.commits.push(CommitRecord {
            id: id.clone(),
            message: message.to_string(),
            files,
            committed_at: Utc::now(),
        });
        metadata.staged.clear();
        self.metadata.save(&metadata, &lock)?;

        log::info!("Commit created: {id}");
        Ok(id)
    }

    fn create_commit_dir(&self) -> Result<(String, PathBuf)> {
        let commits_dir = self.layout.commits_dir();
        ensure_dir(&commits_dir)?;

        let mut last_err = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_commit_id();
            let dir = commits_dir.join(&id);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("Commit id {id} already taken, generating another");
                    last_err = Some(e);
                }
                Err(e) => return Err(VcsError::directory_creation_failed(&dir, e)),
            }
        }

        let err = last_err
            .unwrap_or_else(|| std::io::Error::new(ErrorKind::AlreadyExists, "commit id collision"));
        Err(VcsError::directory_creation_failed(commits_dir, err))
    }
}
