//! Staging area: validated working copies queued for the next commit.
//!
//! A staged file is identified by its base name. Staging a file whose name
//! is already staged moves the earlier copy aside to
//! `<name>.backup.<timestamp>` before writing the new one, so repeated
//! staging never loses data.

use crate::core::dirs::{ensure_dir, RepoLayout};
use crate::core::error::{Result, VcsError};
use crate::core::ids::fs_safe_timestamp;
use crate::core::lock::{MetadataLock, DEFAULT_LOCK_TIMEOUT};
use crate::core::metadata::MetadataStore;
use crate::core::state::StagingEntry;
use chrono::Utc;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Bytes read up front to surface permission or lock failures early.
pub const READ_PROBE_BYTES: usize = 1024;

pub struct StagingManager {
    layout: RepoLayout,
    metadata: MetadataStore,
}

impl StagingManager {
    pub fn new(layout: RepoLayout) -> Self {
        let metadata = MetadataStore::new(&layout);
        Self { layout, metadata }
    }

    /// Stage `path` (absolute, or relative to the current directory).
    pub fn stage(&self, path: impl AsRef<Path>) -> Result<StagingEntry> {
        let source = resolve_source(path.as_ref())?;
        let size = check_source(&source)?;
        if is_within(&source, &self.layout.meta_dir()) {
            log::error!("Refusing to stage '{}' from the metadata directory", source.display());
            return Err(VcsError::inside_meta_dir(&source));
        }

        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| VcsError::not_a_file(&source))?;

        let lock = MetadataLock::acquire(&self.layout, DEFAULT_LOCK_TIMEOUT)?;
        // Fail on a corrupt commit.json before touching the staging directory.
        let mut metadata = self.metadata.load()?;

        let staging_dir = self.layout.staging_dir();
        ensure_dir(&staging_dir)?;
        let staged_path = staging_dir.join(&filename);

        if staged_path.exists() {
            let backup = backup_path(&staging_dir, &filename);
            fs::rename(&staged_path, &backup)?;
            log::info!(
                "Existing staged file renamed to backup: {}",
                backup.display()
            );
        }

        fs::copy(&source, &staged_path)
            .map_err(|e| VcsError::copy_failed(&source, &staged_path, e))?;
        log::debug!("Copied {} -> {}", source.display(), staged_path.display());

        let entry = StagingEntry {
            filename,
            original_path: source,
            staged_path,
            size,
            staged_at: Utc::now(),
        };
        metadata.upsert_staged(entry.clone());
        self.metadata.save(&metadata, &lock)?;

        log::info!("Staged {} ({} bytes)", entry.filename, entry.size);
        Ok(entry)
    }
}

fn resolve_source(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Check that `source` is a readable regular file and return its size.
fn check_source(source: &Path) -> Result<u64> {
    let metadata = match fs::metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(VcsError::not_found(source)),
        Err(e) => return Err(VcsError::unreadable(source, e)),
    };

    if !metadata.is_file() {
        return Err(VcsError::not_a_file(source));
    }

    let mut probe = [0u8; READ_PROBE_BYTES];
    let read = File::open(source)
        .and_then(|mut file| file.read(&mut probe))
        .map_err(|e| VcsError::unreadable(source, e))?;
    log::debug!("Read {read} bytes from {} (permission OK)", source.display());

    Ok(metadata.len())
}

/// Whether `path` resolves to a location below `dir`. False when either is missing.
fn is_within(path: &Path, dir: &Path) -> bool {
    match (fs::canonicalize(path), fs::canonicalize(dir)) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => false,
    }
}

/// `<name>.backup.<timestamp>`, with a counter appended if that name is taken.
fn backup_path(staging_dir: &Path, filename: &str) -> PathBuf {
    let base = format!("{filename}.backup.{}", fs_safe_timestamp(Utc::now()));
    let mut candidate = staging_dir.join(&base);
    let mut counter = 1;
    while candidate.exists() {
        candidate = staging_dir.join(format!("{base}-{counter}"));
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StagingManager, RepoLayout) {
        let temp = TempDir::new().unwrap();
        let layout = RepoLayout::new(temp.path().join("repo"));
        fs::create_dir_all(layout.root()).unwrap();
        (temp, StagingManager::new(layout.clone()), layout)
    }

    #[test]
    fn test_stage_copies_file_and_records_entry() -> Result<()> {
        let (temp, manager, layout) = setup();
        let source = temp.path().join("notes.txt");
        fs::write(&source, "0123456789")?;

        let entry = manager.stage(&source)?;

        assert_eq!(entry.filename, "notes.txt");
        assert_eq!(entry.size, 10);
        assert_eq!(entry.original_path, source);
        assert_eq!(entry.staged_path, layout.staging_dir().join("notes.txt"));
        assert_eq!(fs::read(&entry.staged_path)?, b"0123456789");

        let metadata = MetadataStore::new(&layout).load()?;
        assert_eq!(metadata.staged, vec![entry]);
        Ok(())
    }

    #[test]
    fn test_stage_missing_file() {
        let (temp, manager, layout) = setup();
        let result = manager.stage(temp.path().join("absent.txt"));

        assert!(matches!(result, Err(VcsError::NotFound { .. })));
        assert!(!layout.metadata_file().exists());
    }

    #[test]
    fn test_stage_directory_is_not_a_file() {
        let (temp, manager, _) = setup();
        let result = manager.stage(temp.path());
        assert!(matches!(result, Err(VcsError::NotAFile { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_stage_unreadable_file() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (temp, manager, _) = setup();
        let source = temp.path().join("secret.txt");
        fs::write(&source, "top secret")?;
        fs::set_permissions(&source, fs::Permissions::from_mode(0o000))?;

        // Root ignores permission bits; nothing to assert there.
        if File::open(&source).is_ok() {
            return Ok(());
        }

        let result = manager.stage(&source);
        assert!(matches!(result, Err(VcsError::Unreadable { .. })));
        Ok(())
    }

    #[test]
    fn test_restage_same_name_keeps_backup() -> Result<()> {
        let (temp, manager, layout) = setup();
        fs::create_dir_all(temp.path().join("a"))?;
        fs::create_dir_all(temp.path().join("b"))?;
        let first = temp.path().join("a/notes.txt");
        let second = temp.path().join("b/notes.txt");
        fs::write(&first, "first version")?;
        fs::write(&second, "second")?;

        manager.stage(&first)?;
        let entry = manager.stage(&second)?;

        assert_eq!(fs::read(&entry.staged_path)?, b"second");

        let staged: Vec<_> = fs::read_dir(layout.staging_dir())?
            .collect::<std::io::Result<Vec<_>>>()?;
        assert_eq!(staged.len(), 2);
        let backup = staged
            .iter()
            .find(|e| e.file_name().to_string_lossy().starts_with("notes.txt.backup."))
            .expect("backup file present");
        assert_eq!(fs::read(backup.path())?, b"first version");

        let total: u64 = staged
            .iter()
            .map(|e| e.metadata().map(|m| m.len()))
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .sum();
        assert_eq!(total, ("first version".len() + "second".len()) as u64);

        let metadata = MetadataStore::new(&layout).load()?;
        assert_eq!(metadata.staged.len(), 1);
        assert_eq!(metadata.staged[0].original_path, second);
        Ok(())
    }

    #[test]
    fn test_backup_path_avoids_existing_names() -> Result<()> {
        let temp = TempDir::new()?;
        let first = backup_path(temp.path(), "a.txt");
        fs::write(&first, "x")?;
        let second = backup_path(temp.path(), "a.txt");

        assert_ne!(first, second);
        assert!(second
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("a.txt.backup."));
        Ok(())
    }

    #[test]
    fn test_staging_a_staged_copy_is_rejected() -> Result<()> {
        let (temp, manager, layout) = setup();
        let source = temp.path().join("notes.txt");
        fs::write(&source, "0123456789")?;
        let entry = manager.stage(&source)?;
        let before = fs::read(layout.metadata_file())?;

        let result = manager.stage(&entry.staged_path);
        assert!(matches!(result, Err(VcsError::InsideMetaDir { .. })));

        let dotted = layout.root().join(".repoMeta/./staging/notes.txt");
        assert!(matches!(manager.stage(dotted), Err(VcsError::InsideMetaDir { .. })));

        assert_eq!(fs::read(&entry.staged_path)?, b"0123456789");
        assert_eq!(fs::read(layout.metadata_file())?, before);
        assert_eq!(fs::read_dir(layout.staging_dir())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_committed_copy_cannot_be_staged() -> Result<()> {
        let (_temp, manager, layout) = setup();
        let snapshot = layout.commit_dir("some-id").join("notes.txt");
        fs::create_dir_all(snapshot.parent().unwrap())?;
        fs::write(&snapshot, "old")?;

        let result = manager.stage(&snapshot);
        assert!(matches!(result, Err(VcsError::InsideMetaDir { .. })));
        assert!(!layout.metadata_file().exists());
        Ok(())
    }

    #[test]
    fn test_corrupt_metadata_leaves_staging_untouched() -> Result<()> {
        let (temp, manager, layout) = setup();
        fs::create_dir_all(layout.meta_dir())?;
        fs::write(layout.metadata_file(), "{ broken")?;
        let source = temp.path().join("notes.txt");
        fs::write(&source, "data")?;

        let result = manager.stage(&source);
        assert!(matches!(result, Err(VcsError::MetadataParseFailed { .. })));
        assert!(!layout.staging_dir().join("notes.txt").exists());
        Ok(())
    }
}
