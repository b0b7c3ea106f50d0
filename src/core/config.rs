use crate::core::dirs::{get_config_directory, RepoLayout};
use crate::core::error::VcsError;
use crate::core::sync::CancellationToken;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "AWS_SECRET_KEY";
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_ENDPOINT: &str = "S3_ENDPOINT";

pub const DEFAULT_UPLOAD_JOBS: usize = 4;

/// Remote object-store settings as collected from config files, environment
/// and flags. Any field may be missing; see [`RemoteSettings::resolve`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
}

/// Complete remote settings, ready to build an object-store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint: Option<String>,
}

impl RemoteSettings {
    /// Settings from the user config file, the repository config file and the
    /// environment, later sources overriding earlier ones.
    pub fn load(layout: &RepoLayout) -> Result<Self, VcsError> {
        let mut settings = Self::default();

        let user_file = get_config_directory()?.join("remote.json");
        settings.merge(Self::from_file(&user_file)?);
        settings.merge(Self::from_file(&layout.config_file())?);
        settings.merge(Self::from_env());

        Ok(settings)
    }

    /// Read settings from a JSON file. A missing file yields empty settings.
    pub fn from_file(path: &Path) -> Result<Self, VcsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        log::debug!("Loading remote settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| VcsError::config_parse_failed(path, e))
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            region: lookup(ENV_REGION),
            access_key_id: lookup(ENV_ACCESS_KEY),
            secret_access_key: lookup(ENV_SECRET_KEY),
            bucket: lookup(ENV_BUCKET),
            endpoint: lookup(ENV_ENDPOINT),
        }
    }

    /// Overlay every non-empty field of `other` onto `self`.
    pub fn merge(&mut self, other: RemoteSettings) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                *slot = Some(v);
            }
        }
        take(&mut self.region, other.region);
        take(&mut self.access_key_id, other.access_key_id);
        take(&mut self.secret_access_key, other.secret_access_key);
        take(&mut self.bucket, other.bucket);
        take(&mut self.endpoint, other.endpoint);
    }

    /// Names of required settings that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let mut missing = Vec::new();
        if !present(&self.region) {
            missing.push("region");
        }
        if !present(&self.access_key_id) {
            missing.push("access key");
        }
        if !present(&self.secret_access_key) {
            missing.push("secret key");
        }
        if !present(&self.bucket) {
            missing.push("bucket");
        }
        missing
    }

    pub fn resolve(&self) -> Result<RemoteConfig, VcsError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(VcsError::RemoteConfigIncomplete { missing });
        }
        let get = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        Ok(RemoteConfig {
            region: get(&self.region),
            access_key_id: get(&self.access_key_id),
            secret_access_key: get(&self.secret_access_key),
            bucket: get(&self.bucket),
            endpoint: self
                .endpoint
                .as_deref()
                .map(|e| e.trim().trim_end_matches('/').to_string())
                .filter(|e| !e.is_empty()),
        })
    }
}

/// Where a push sends the commit store. Built per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub mirror_dir: PathBuf,
    pub remote: RemoteSettings,
}

impl RemoteTarget {
    /// Default mirror directory with no remote object store.
    pub fn local_only(layout: &RepoLayout) -> Self {
        Self {
            mirror_dir: layout.remote_dir(),
            remote: RemoteSettings::default(),
        }
    }

    pub fn with_remote(layout: &RepoLayout, remote: RemoteSettings) -> Self {
        Self {
            mirror_dir: layout.remote_dir(),
            remote,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Upload worker count, at least one.
    pub jobs: usize,
    pub cancel: CancellationToken,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_UPLOAD_JOBS,
            cancel: CancellationToken::new(),
        }
    }
}
