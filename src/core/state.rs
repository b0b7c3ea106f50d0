//! Persisted repository state.
//!
//! This module defines the records stored in `commit.json`: the files queued
//! in the staging area and the append-only list of commits.
//!
//! # Public API
//! - [`StagingEntry`]: One file queued for the next commit
//! - [`CommittedFile`]: A staging entry captured by a commit, with its snapshot location
//! - [`CommitRecord`]: An immutable commit snapshot
//! - [`RepositoryMetadata`]: The whole `commit.json` document
//!
//! # Serialization
//! - **camelCase JSON**: field names match the on-disk `commit.json` shape
//! - **RFC 3339 timestamps**: all times are UTC
//! - **Lenient defaults**: a document missing `staged` or `commits` reads as empty

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingEntry {
    /// Base name, the identity of the entry inside the staging area.
    pub filename: String,
    pub original_path: PathBuf,
    pub staged_path: PathBuf,
    pub size: u64,
    pub staged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedFile {
    #[serde(flatten)]
    pub entry: StagingEntry,
    pub committed_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub id: String,
    pub message: String,
    pub files: Vec<CommittedFile>,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default)]
    pub staged: Vec<StagingEntry>,
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
}

impl RepositoryMetadata {
    /// Insert `entry`, replacing any entry staged at the same destination path.
    ///
    /// The replaced entry's position is not kept; the new entry goes last.
    pub fn upsert_staged(&mut self, entry: StagingEntry) {
        self.staged.retain(|e| e.staged_path != entry.staged_path);
        self.staged.push(entry);
    }

    pub fn find_commit(&self, id: &str) -> Option<&CommitRecord> {
        self.commits.iter().find(|c| c.id == id)
    }

    pub fn latest_commit(&self) -> Option<&CommitRecord> {
        self.commits.last()
    }
}
