//! Core functionality for the mini-vcs tool.
//!
//! This module provides the repository engine: staging, commits, push,
//! the on-disk layout and metadata, and the shared error and output types.

pub mod commit;
pub mod config;
pub mod dirs;
pub mod error;
pub mod ids;
pub mod lock;
pub mod metadata;
pub mod object_store;
pub mod output;
pub mod repository;
pub mod staging;
pub mod state;
pub mod sync;
pub mod tree_walk;
pub mod upload;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{Result, VcsError};

// === Repository operations ===
// One facade per root plus the managers it delegates to
pub use commit::CommitManager;
pub use repository::Repository;
pub use staging::StagingManager;
pub use sync::{CancellationToken, PushReport, SyncManager};

// === State management ===
// Data structures persisted in commit.json
pub use self::dirs::RepoLayout;
pub use metadata::MetadataStore;
pub use state::{CommitRecord, CommittedFile, RepositoryMetadata, StagingEntry};

// === Remote ===
// Remote settings, object stores and per-file upload results
pub use config::{PushOptions, RemoteConfig, RemoteSettings, RemoteTarget};
pub use object_store::{MemoryObjectStore, ObjectStore, S3ObjectStore};
pub use upload::UploadResult;

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{
    format_size, print_error, print_info, print_item_result, print_section_header,
    print_success, print_warning,
};
