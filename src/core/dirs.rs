use crate::core::error::VcsError;
use std::path::{Path, PathBuf};

pub const META_DIR_NAME: &str = ".repoMeta";
pub const METADATA_FILE_NAME: &str = "commit.json";

/// On-disk layout of a repository rooted at `root`.
///
/// ```text
/// <root>/.repoMeta/staging/<filename>
/// <root>/.repoMeta/commits/<commitId>/<filename>
/// <root>/.repoMeta/remote/<commitId>/<filename>
/// <root>/commit.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR_NAME)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.meta_dir().join("staging")
    }

    pub fn commits_dir(&self) -> PathBuf {
        self.meta_dir().join("commits")
    }

    pub fn remote_dir(&self) -> PathBuf {
        self.meta_dir().join("remote")
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.root.join(METADATA_FILE_NAME)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.meta_dir().join("meta.lock")
    }

    /// Repository-level remote settings.
    pub fn config_file(&self) -> PathBuf {
        self.meta_dir().join("config.json")
    }

    pub fn commit_dir(&self, commit_id: &str) -> PathBuf {
        self.commits_dir().join(commit_id)
    }
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), VcsError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        log::error!("Failed to create directory '{}': {}", dir.display(), e);
        VcsError::directory_creation_failed(dir, e)
    })
}

pub fn get_config_directory() -> Result<PathBuf, VcsError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().unwrap_or_default(),
    };

    Ok(base.join("mini-vcs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = RepoLayout::new("/work/project");

        assert_eq!(layout.meta_dir(), PathBuf::from("/work/project/.repoMeta"));
        assert_eq!(layout.staging_dir(), PathBuf::from("/work/project/.repoMeta/staging"));
        assert_eq!(layout.commits_dir(), PathBuf::from("/work/project/.repoMeta/commits"));
        assert_eq!(layout.remote_dir(), PathBuf::from("/work/project/.repoMeta/remote"));
        assert_eq!(layout.metadata_file(), PathBuf::from("/work/project/commit.json"));
        assert_eq!(
            layout.commit_dir("2024-01-01T00-00-00-000Z-abcd1234"),
            PathBuf::from("/work/project/.repoMeta/commits/2024-01-01T00-00-00-000Z-abcd1234")
        );
    }

    #[test]
    fn test_ensure_dir_is_idempotent() -> Result<(), VcsError> {
        let temp = tempfile::TempDir::new()?;
        let dir = temp.path().join("a").join("b");
        ensure_dir(&dir)?;
        ensure_dir(&dir)?;
        assert!(dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_config_directory_ends_with_app_name() -> Result<(), VcsError> {
        let dir = get_config_directory()?;
        assert!(dir.ends_with("mini-vcs"));
        Ok(())
    }
}
