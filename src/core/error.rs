//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`VcsError`] which covers every failure the staging,
//! commit and push operations can report. It uses `thiserror` for ergonomic
//! error definitions and includes constructors for the common failure
//! scenarios so call sites stay short.
//!
//! # Public API
//! - [`VcsError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, VcsError>`
//!
//! # Error Categories
//! - **Staging**: source missing, not a regular file, unreadable
//! - **Commit**: empty message, nothing staged
//! - **Push**: no commit store, incomplete remote config, per-file upload failures
//! - **Metadata**: read, parse and write failures of `commit.json`, lock timeouts

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for mini-vcs
#[derive(Error, Debug)]
pub enum VcsError {
    // Staging errors
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Unable to read file (permission/lock) '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    // Commit errors
    #[error("Commit message must not be empty")]
    EmptyMessage,

    #[error("Nothing to commit. Stage files first with 'mini-vcs stage <file>'")]
    NothingStaged,

    // Push errors
    #[error("No commits found at '{path}'. Run 'mini-vcs commit \"message\"' first")]
    NoCommits { path: PathBuf },

    #[error("Remote configuration incomplete, missing: {}", missing.join(", "))]
    RemoteConfigIncomplete { missing: Vec<&'static str> },

    #[error("Upload failed for '{key}': {cause}")]
    UploadFailed { key: String, cause: String },

    #[error("Failed to sign request: {cause}")]
    SigningFailed { cause: String },

    #[error("Cannot stage '{path}': it is inside the repository metadata directory")]
    InsideMetaDir { path: PathBuf },

    #[error("Push incomplete: {failed} step(s) did not succeed")]
    PushIncomplete { failed: usize },

    // Filesystem errors
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Metadata errors
    #[error("Failed to read metadata file '{path}': {source}")]
    MetadataReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse metadata file '{path}': {source}")]
    MetadataParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write metadata file '{path}': {source}")]
    MetadataWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Timed out waiting for repository lock '{path}'")]
    LockTimeout { path: PathBuf },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using VcsError
pub type Result<T> = std::result::Result<T, VcsError>;

impl VcsError {
    /// Create a file not found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a not-a-regular-file error
    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create an unreadable file error
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a missing commit store error
    pub fn no_commits(path: impl Into<PathBuf>) -> Self {
        Self::NoCommits { path: path.into() }
    }

    /// Create an upload failed error for a single object key
    pub fn upload_failed(key: impl Into<String>, cause: impl ToString) -> Self {
        Self::UploadFailed {
            key: key.into(),
            cause: cause.to_string(),
        }
    }

    pub fn signing_failed(cause: impl ToString) -> Self {
        Self::SigningFailed {
            cause: cause.to_string(),
        }
    }

    /// Create an error for a source that lives under `.repoMeta`
    pub fn inside_meta_dir(path: impl Into<PathBuf>) -> Self {
        Self::InsideMetaDir { path: path.into() }
    }

    pub fn copy_failed(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CopyFailed {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    pub fn directory_creation_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    pub fn metadata_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MetadataReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn metadata_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::MetadataParseFailed {
            path: path.into(),
            source,
        }
    }

    pub fn metadata_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MetadataWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn lock_timeout(path: impl Into<PathBuf>) -> Self {
        Self::LockTimeout { path: path.into() }
    }

    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running the same operation may succeed without changing its input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreadable { .. }
                | Self::UploadFailed { .. }
                | Self::PushIncomplete { .. }
                | Self::LockTimeout { .. }
                | Self::CopyFailed { .. }
                | Self::MetadataWriteFailed { .. }
                | Self::Io(_)
        )
    }
}
