//! Commit identifiers and filesystem-safe timestamps.
//!
//! Identifiers sort by creation time and carry a random suffix, so two
//! commits made in the same millisecond still get distinct names.

use chrono::{DateTime, Utc};
use rand::RngCore;

/// Number of random bytes appended to a commit id.
const SUFFIX_BYTES: usize = 4;

/// ISO-8601 UTC with millisecond precision, `:` and `.` replaced by `-`.
///
/// `2024-03-05T14:07:09.123Z` becomes `2024-03-05T14-07-09-123Z`.
pub fn fs_safe_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

pub fn generate_commit_id() -> String {
    commit_id_at(Utc::now())
}

pub fn commit_id_at(at: DateTime<Utc>) -> String {
    let mut suffix = [0u8; SUFFIX_BYTES];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!("{}-{}", fs_safe_timestamp(at), hex::encode(suffix))
}
