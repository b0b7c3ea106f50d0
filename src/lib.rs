//! mini-vcs - a small file-snapshot version control tool.
//!
//! Files are staged into a working area, committed as immutable snapshots,
//! and pushed to a local mirror and optionally an S3 bucket.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - The [`Repository`] facade over staging, commit and push
//! - Commit metadata types
//! - Remote settings and object stores
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Repository operations
    CancellationToken,
    CommitRecord,
    CommittedFile,
    MemoryObjectStore,
    ObjectStore,
    PushOptions,
    PushReport,
    RemoteSettings,
    RemoteTarget,
    Repository,
    RepositoryMetadata,
    // Error handling
    Result,
    StagingEntry,
    UploadResult,
    VcsError,
};
