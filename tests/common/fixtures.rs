//! Predefined repository scenarios

#![allow(dead_code)]

use super::repository::*;

/// Scenario: one staged file, `notes.txt` holding 10 bytes
pub fn repo_with_staged_file() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;
    let notes = create_file(&repo, "notes.txt", "0123456789")?;
    stage(&repo, &notes)?;
    Ok(repo)
}

/// Scenario: one commit "first" containing `notes.txt`
pub fn repo_with_commit() -> anyhow::Result<TestRepo> {
    let repo = repo_with_staged_file()?;
    commit(&repo, "first")?;
    Ok(repo)
}

/// Scenario: two commits, "first" with `notes.txt` and "second" with
/// `a.txt` and `b.txt`
pub fn repo_with_two_commits() -> anyhow::Result<TestRepo> {
    let repo = repo_with_commit()?;
    let a = create_file(&repo, "a.txt", "a")?;
    let b = create_file(&repo, "b.txt", "bb")?;
    stage(&repo, &a)?;
    stage(&repo, &b)?;
    commit(&repo, "second")?;
    Ok(repo)
}
