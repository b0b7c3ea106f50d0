//! Bounded worker pool for object uploads.
//!
//! Workers claim jobs from a shared cursor and report one [`UploadResult`]
//! per file over a channel. Cancelling stops workers from claiming new jobs;
//! uploads already in flight finish and are reported normally.

use crate::core::object_store::ObjectStore;
use crate::core::sync::CancellationToken;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub key: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    fn success(key: String) -> Self {
        Self {
            key,
            ok: true,
            error: None,
        }
    }

    fn failure(key: String, error: String) -> Self {
        Self {
            key,
            ok: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    /// Results sorted by key.
    pub results: Vec<UploadResult>,
    /// Jobs never started because of cancellation.
    pub not_attempted: usize,
}

pub fn upload_all(
    store: &dyn ObjectStore,
    jobs: &[UploadJob],
    workers: usize,
    cancel: &CancellationToken,
) -> UploadOutcome {
    let workers = workers.max(1).min(jobs.len().max(1));
    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            scope.spawn(move || loop {
                if cancel.is_cancelled() {
                    log::debug!("Upload worker {worker} stopping: cancelled");
                    break;
                }
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(job) = jobs.get(index) else { break };

                let result = upload_one(store, job);
                if tx.send(result).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut results: Vec<UploadResult> = rx.into_iter().collect();
    results.sort_by(|a, b| a.key.cmp(&b.key));
    let not_attempted = jobs.len() - results.len();
    if not_attempted > 0 {
        log::warn!("{not_attempted} upload(s) not attempted");
    }

    UploadOutcome {
        results,
        not_attempted,
    }
}

fn upload_one(store: &dyn ObjectStore, job: &UploadJob) -> UploadResult {
    let body = match std::fs::read(&job.path) {
        Ok(body) => body,
        Err(e) => {
            log::error!("Failed to read '{}' for upload: {e}", job.path.display());
            return UploadResult::failure(job.key.clone(), format!("read failed: {e}"));
        }
    };

    match store.put(&job.key, body) {
        Ok(()) => {
            log::info!("Uploaded {}", job.key);
            UploadResult::success(job.key.clone())
        }
        Err(e) => {
            log::error!("{e}");
            UploadResult::failure(job.key.clone(), e.to_string())
        }
    }
}
