//! Loading and saving `commit.json`.
//!
//! The whole document is read, changed in memory and written back. Writes go
//! to a temporary sibling first and are renamed into place, so readers never
//! observe a half-written file.

use crate::core::dirs::RepoLayout;
use crate::core::error::{Result, VcsError};
use crate::core::lock::MetadataLock;
use crate::core::state::RepositoryMetadata;
use std::fs;
use std::path::{Path, PathBuf};

pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(layout: &RepoLayout) -> Self {
        Self {
            path: layout.metadata_file(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current metadata. A missing or empty file reads as empty metadata.
    pub fn load(&self) -> Result<RepositoryMetadata> {
        if !self.path.exists() {
            log::debug!("Metadata file {} does not exist yet", self.path.display());
            return Ok(RepositoryMetadata::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            log::error!("Failed to read metadata '{}': {}", self.path.display(), e);
            VcsError::metadata_read_failed(&self.path, e)
        })?;

        if content.trim().is_empty() {
            return Ok(RepositoryMetadata::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            log::error!("Failed to parse metadata '{}': {}", self.path.display(), e);
            VcsError::metadata_parse_failed(&self.path, e)
        })
    }

    /// Write `metadata` as pretty-printed JSON, replacing the previous document.
    ///
    /// Requires the repository lock so that concurrent writers cannot interleave.
    pub fn save(&self, metadata: &RepositoryMetadata, _lock: &MetadataLock) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            log::error!("Failed to write metadata '{}': {}", tmp.display(), e);
            VcsError::metadata_write_failed(&tmp, e)
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            log::error!("Failed to replace metadata '{}': {}", self.path.display(), e);
            VcsError::metadata_write_failed(&self.path, e)
        })?;

        log::debug!(
            "Saved metadata: {} staged, {} commits",
            metadata.staged.len(),
            metadata.commits.len()
        );
        Ok(())
    }
}
