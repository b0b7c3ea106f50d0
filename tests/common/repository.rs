//! Repository setup utilities
//!
//! Provides a throwaway repository root plus a scratch directory for source
//! files, and a preconfigured command that never sees the caller's AWS
//! settings or user config.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Remote settings variables cleared from every spawned command.
pub const REMOTE_ENV_VARS: [&str; 5] = [
    "AWS_REGION",
    "AWS_ACCESS_KEY",
    "AWS_SECRET_KEY",
    "S3_BUCKET",
    "S3_ENDPOINT",
];

/// Test repository setup result. The TempDir must be kept alive for the
/// duration of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    /// Repository root
    pub path: PathBuf,
    /// Directory holding files to stage
    pub work: PathBuf,
    /// Stand-in for the user config directory
    pub config_home: PathBuf,
}

impl TestRepo {
    /// Get the repository path as a reference
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.path.join(".repoMeta")
    }

    pub fn commits_dir(&self) -> PathBuf {
        self.meta_dir().join("commits")
    }

    pub fn remote_dir(&self) -> PathBuf {
        self.meta_dir().join("remote")
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.path.join("commit.json")
    }

    /// The `mini-vcs` binary, run inside the repository root with a clean
    /// remote environment.
    pub fn cmd(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("mini-vcs")?;
        cmd.current_dir(&self.path)
            .env("XDG_CONFIG_HOME", &self.config_home)
            .env("HOME", self.temp_dir.path())
            .env("NO_COLOR", "1");
        for var in REMOTE_ENV_VARS {
            cmd.env_remove(var);
        }
        Ok(cmd)
    }

    /// Parsed `commit.json`.
    pub fn metadata(&self) -> anyhow::Result<serde_json::Value> {
        let content = fs::read_to_string(self.metadata_file())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Ids of the commit directories on disk, sorted.
    pub fn commit_ids(&self) -> anyhow::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.commits_dir())? {
            ids.push(entry?.file_name().to_string_lossy().into_owned());
        }
        ids.sort();
        Ok(ids)
    }
}

/// Sets up a fresh, empty repository root
pub fn setup_test_repo() -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("repo");
    let work = temp_dir.path().join("work");
    let config_home = temp_dir.path().join("config");
    fs::create_dir_all(&path)?;
    fs::create_dir_all(&work)?;
    fs::create_dir_all(&config_home)?;

    Ok(TestRepo {
        temp_dir,
        path,
        work,
        config_home,
    })
}

/// Creates a file below the work directory and returns its path
pub fn create_file(repo: &TestRepo, relative: &str, content: &str) -> anyhow::Result<PathBuf> {
    let path = repo.work.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Stages `path` through the binary
pub fn stage(repo: &TestRepo, path: &Path) -> anyhow::Result<()> {
    repo.cmd()?.arg("stage").arg(path).assert().success();
    Ok(())
}

/// Commits through the binary
pub fn commit(repo: &TestRepo, message: &str) -> anyhow::Result<()> {
    repo.cmd()?
        .args(["commit", "-m", message])
        .assert()
        .success();
    Ok(())
}
