//! Iterative depth-first walk over a directory tree.
//!
//! Symbolic links are followed, but each directory is entered at most once
//! (tracked by canonical path) and depth is bounded, so link cycles cannot
//! make the walk loop forever.

use crate::core::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_WALK_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub relative: PathBuf,
    pub kind: EntryKind,
}

impl WalkEntry {
    /// Number of components in the relative path; top-level entries have depth 1.
    pub fn depth(&self) -> usize {
        self.relative.components().count()
    }

    /// Relative path joined with `/` regardless of platform.
    pub fn relative_key(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Result of a walk: every reachable entry plus the directories that could
/// not be read.
#[derive(Debug, Default)]
pub struct Walk {
    pub entries: Vec<WalkEntry>,
    pub skipped: Vec<SkippedDir>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

/// Walk everything below `root` (the root itself is not returned).
///
/// Entries come in depth-first pre-order: a directory, then its files sorted
/// by name, then each subdirectory's subtree in name order. Anything that is
/// neither a directory nor a regular file (sockets, dangling links) is skipped.
/// Only an unreadable `root` is an error; subdirectories that cannot be read
/// are listed in [`Walk::skipped`] and the walk carries on.
pub fn walk(root: &Path) -> Result<Walk> {
    let mut walk = Walk::default();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    visited.insert(fs::canonicalize(root)?);

    let mut stack: Vec<(PathBuf, PathBuf, usize)> = vec![(root.to_path_buf(), PathBuf::new(), 0)];

    while let Some((dir, relative, depth)) = stack.pop() {
        if depth > 0 {
            walk.entries.push(WalkEntry {
                path: dir.clone(),
                relative: relative.clone(),
                kind: EntryKind::Dir,
            });
        }

        let names = match sorted_names(&dir) {
            Ok(names) => names,
            Err(e) if depth == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping '{}': {e}", dir.display());
                walk.skipped.push(SkippedDir {
                    path: dir,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for name in names {
            let path = dir.join(&name);
            let child_relative = relative.join(&name);

            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Skipping '{}': {e}", path.display());
                    continue;
                }
            };

            if metadata.is_dir() {
                if depth + 1 > MAX_WALK_DEPTH {
                    log::warn!("Skipping '{}': deeper than {MAX_WALK_DEPTH} levels", path.display());
                    continue;
                }
                let canonical = match fs::canonicalize(&path) {
                    Ok(canonical) => canonical,
                    Err(e) => {
                        log::warn!("Skipping '{}': {e}", path.display());
                        walk.skipped.push(SkippedDir {
                            path,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };
                if !visited.insert(canonical) {
                    log::warn!("Skipping '{}': directory already visited", path.display());
                    continue;
                }
                subdirs.push((path, child_relative, depth + 1));
            } else if metadata.is_file() {
                walk.entries.push(WalkEntry {
                    path,
                    relative: child_relative,
                    kind: EntryKind::File,
                });
            }
        }

        // Pushed in reverse so the first subdirectory is walked first.
        stack.extend(subdirs.into_iter().rev());
    }

    Ok(walk)
}

fn sorted_names(dir: &Path) -> std::io::Result<Vec<std::ffi::OsString>> {
    let mut names: Vec<_> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn relatives(entries: &[WalkEntry]) -> Vec<String> {
        entries.iter().map(|e| e.relative_key()).collect()
    }

    #[test]
    fn test_walk_order_and_kinds() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::create_dir_all(root.join("b/nested"))?;
        fs::create_dir_all(root.join("a"))?;
        fs::write(root.join("a/one.txt"), "1")?;
        fs::write(root.join("b/two.txt"), "2")?;
        fs::write(root.join("b/nested/three.txt"), "3")?;
        fs::write(root.join("top.txt"), "t")?;

        let entries = walk(root)?.entries;
        assert_eq!(
            relatives(&entries),
            vec!["top.txt", "a", "a/one.txt", "b", "b/two.txt", "b/nested", "b/nested/three.txt"]
        );
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert_eq!(entries[6].depth(), 3);
        Ok(())
    }

    #[test]
    fn test_walk_empty_root() -> Result<()> {
        let temp = TempDir::new()?;
        let walk = walk(temp.path())?;
        assert!(walk.entries.is_empty());
        assert!(walk.skipped.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_survives_symlink_cycle() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::create_dir_all(root.join("c1"))?;
        fs::write(root.join("c1/file.txt"), "x")?;
        std::os::unix::fs::symlink(root, root.join("c1/loop"))?;

        let entries = walk(root)?.entries;
        assert_eq!(relatives(&entries), vec!["c1", "c1/file.txt"]);
        Ok(())
    }

    #[test]
    fn test_walk_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(walk(&temp.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_unreadable_subdirectory() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new()?;
        let root = temp.path();
        fs::create_dir_all(root.join("locked"))?;
        fs::create_dir_all(root.join("open"))?;
        fs::write(root.join("locked/hidden.txt"), "h")?;
        fs::write(root.join("open/seen.txt"), "s")?;
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000))?;

        // Root ignores permission bits; nothing to assert there.
        if fs::read_dir(root.join("locked")).is_ok() {
            fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let result = walk(root);
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755))?;
        let walk = result?;

        assert_eq!(relatives(&walk.entries), vec!["locked", "open", "open/seen.txt"]);
        assert_eq!(walk.skipped.len(), 1);
        assert_eq!(walk.skipped[0].path, root.join("locked"));
        Ok(())
    }
}
