//! Cross-process advisory lock around repository mutations.
//!
//! Every read-modify-write of `commit.json`, and every commit directory
//! creation, happens while a [`MetadataLock`] is held. The lock is released
//! when the guard is dropped, including on early returns through `?`.

use crate::core::dirs::{ensure_dir, RepoLayout};
use crate::core::error::{Result, VcsError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct MetadataLock {
    file: File,
    path: PathBuf,
}

impl MetadataLock {
    /// Acquire the repository lock, waiting up to `timeout`.
    pub fn acquire(layout: &RepoLayout, timeout: Duration) -> Result<Self> {
        ensure_dir(&layout.meta_dir())?;
        let path = layout.lock_file();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        let start = Instant::now();
        let mut delay = INITIAL_BACKOFF;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if start.elapsed() < timeout => {
                    log::debug!("Lock '{}' busy ({e}), retrying in {delay:?}", path.display());
                    std::thread::sleep(delay);
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
                Err(e) => {
                    log::warn!("Timed out waiting for lock '{}': {e}", path.display());
                    return Err(VcsError::lock_timeout(&path));
                }
            }
        }

        log::debug!("Acquired repository lock {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for MetadataLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Failed to release lock '{}': {e}", self.path.display());
        } else {
            log::debug!("Released repository lock {}", self.path.display());
        }
    }
}
