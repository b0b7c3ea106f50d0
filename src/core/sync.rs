//! Push: mirror the commit store locally and upload it to an object store.
//!
//! A push runs two independent steps:
//! 1. **Local mirror**: always attempted; copies every directory and file of
//!    the commit store into the mirror directory.
//! 2. **Remote upload**: only when the remote settings are complete; every
//!    file at `<commitId>/...` is put under `commits/<commitId>/...`.
//!
//! Neither step rolls back on failure. Re-running a push overwrites by path
//! and by key, so it is always safe to retry an incomplete push.

use crate::core::config::{PushOptions, RemoteTarget};
use crate::core::dirs::{ensure_dir, RepoLayout};
use crate::core::error::{Result, VcsError};
use crate::core::lock::{MetadataLock, DEFAULT_LOCK_TIMEOUT};
use crate::core::object_store::{ObjectStore, S3ObjectStore};
use crate::core::tree_walk::{walk, EntryKind, WalkEntry};
use crate::core::upload::{upload_all, UploadJob, UploadResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Object keys are prefixed with this segment.
pub const REMOTE_KEY_PREFIX: &str = "commits";

/// Shared flag that stops a push from starting new uploads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
    pub local_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_error: Option<String>,
    pub mirror_dir: PathBuf,
    /// Set when the remote step was skipped because settings were incomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    pub remote_results: Vec<UploadResult>,
    pub not_attempted: usize,
}

impl PushReport {
    pub fn failed_uploads(&self) -> impl Iterator<Item = &UploadResult> {
        self.remote_results.iter().filter(|r| !r.ok)
    }

    /// Number of steps that did not succeed: the mirror, each failed upload,
    /// and each upload left unattempted.
    pub fn failure_count(&self) -> usize {
        usize::from(!self.local_ok) + self.failed_uploads().count() + self.not_attempted
    }

    /// True when every attempted step succeeded. A skipped remote does not count
    /// as a failure.
    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn into_result(self) -> Result<Self> {
        match self.failure_count() {
            0 => Ok(self),
            failed => Err(VcsError::PushIncomplete { failed }),
        }
    }
}

pub struct SyncManager {
    layout: RepoLayout,
}

impl SyncManager {
    pub fn new(layout: RepoLayout) -> Self {
        Self { layout }
    }

    /// Push to the mirror directory and, when `target.remote` resolves, to S3.
    pub fn push(&self, target: &RemoteTarget, options: &PushOptions) -> Result<PushReport> {
        match target.remote.resolve() {
            Ok(config) => {
                let destination = config.bucket.clone();
                match S3ObjectStore::new(config) {
                    Ok(store) => {
                        self.push_to(&target.mirror_dir, Some(&store as &dyn ObjectStore), options)
                    }
                    Err(e) => {
                        log::error!("Cannot create object store client: {e}");
                        let store = UnavailableStore {
                            destination,
                            cause: e.to_string(),
                        };
                        self.push_to(&target.mirror_dir, Some(&store as &dyn ObjectStore), options)
                    }
                }
            }
            Err(warning) => {
                log::warn!("{warning}; remote upload will be skipped, only the local mirror is updated");
                let mut report = self.push_to(&target.mirror_dir, None, options)?;
                report.remote_skipped = Some(warning.to_string());
                Ok(report)
            }
        }
    }

    /// Push to `mirror_dir` and, when given, to `store`.
    ///
    /// Fails fast only when there is no commit store; every other problem is
    /// recorded in the returned report.
    pub fn push_to(
        &self,
        mirror_dir: &Path,
        store: Option<&dyn ObjectStore>,
        options: &PushOptions,
    ) -> Result<PushReport> {
        let commits_dir = self.layout.commits_dir();
        if !commits_dir.is_dir() {
            log::error!("No commit store at {}", commits_dir.display());
            return Err(VcsError::no_commits(&commits_dir));
        }

        let mut report = PushReport {
            mirror_dir: mirror_dir.to_path_buf(),
            remote: store.map(|s| s.describe()),
            ..Default::default()
        };

        // Commit directories are created under this lock; holding it while
        // walking keeps half-written commits out of the mirror and upload set.
        let jobs = {
            let _lock = MetadataLock::acquire(&self.layout, DEFAULT_LOCK_TIMEOUT)?;
            let walk = walk(&commits_dir)?;
            log::debug!("Commit store holds {} entries", walk.entries.len());

            let mut errors: Vec<String> = walk
                .skipped
                .iter()
                .map(|s| format!("cannot read '{}': {}", s.path.display(), s.reason))
                .collect();
            let copied = mirror_entries(&walk.entries, mirror_dir, &mut errors);

            if errors.is_empty() {
                report.local_ok = true;
                log::info!("Mirrored {copied} file(s) to {}", mirror_dir.display());
            } else {
                log::error!(
                    "Local mirror incomplete: {copied} file(s) copied, {} problem(s)",
                    errors.len()
                );
                report.local_error = Some(errors.join("; "));
            }

            upload_jobs(&walk.entries)
        };

        if let Some(store) = store {
            log::debug!("Uploading {} file(s) to {}", jobs.len(), store.describe());
            let outcome = upload_all(store, &jobs, options.jobs, &options.cancel);
            report.remote_results = outcome.results;
            report.not_attempted = outcome.not_attempted;
        }

        Ok(report)
    }
}

/// Copy walked entries below `mirror_dir`, overwriting existing files.
///
/// A failed entry is recorded in `errors` and the rest are still copied.
/// Returns the number of files copied.
fn mirror_entries(entries: &[WalkEntry], mirror_dir: &Path, errors: &mut Vec<String>) -> usize {
    if let Err(e) = ensure_dir(mirror_dir) {
        errors.push(e.to_string());
        return 0;
    }

    let mut copied = 0;
    for entry in entries {
        let dest = mirror_dir.join(&entry.relative);
        let result = match entry.kind {
            EntryKind::Dir => ensure_dir(&dest),
            EntryKind::File => copy_file(&entry.path, &dest),
        };
        match result {
            Ok(()) if entry.kind == EntryKind::File => copied += 1,
            Ok(()) => {}
            Err(e) => {
                log::error!("{e}");
                errors.push(e.to_string());
            }
        }
    }
    copied
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(from, to).map_err(|e| VcsError::copy_failed(from, to, e))?;
    Ok(())
}

/// Stand-in for a store whose client could not be built: every upload fails
/// with the build error.
struct UnavailableStore {
    destination: String,
    cause: String,
}

impl ObjectStore for UnavailableStore {
    fn put(&self, key: &str, _body: Vec<u8>) -> Result<()> {
        Err(VcsError::upload_failed(
            key,
            format!("client unavailable: {}", self.cause),
        ))
    }

    fn describe(&self) -> String {
        self.destination.clone()
    }
}

/// Files inside a commit directory become uploads keyed `commits/<relative path>`.
fn upload_jobs(entries: &[WalkEntry]) -> Vec<UploadJob> {
    entries
        .iter()
        .filter(|e| e.kind == EntryKind::File)
        .filter(|e| {
            if e.depth() < 2 {
                log::debug!("Not uploading '{}': outside any commit", e.relative.display());
                return false;
            }
            true
        })
        .map(|e| UploadJob {
            key: format!("{REMOTE_KEY_PREFIX}/{}", e.relative_key()),
            path: e.path.clone(),
        })
        .collect()
}
