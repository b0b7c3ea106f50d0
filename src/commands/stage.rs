use crate::core::{error::Result, format_size, print_success, Repository};
use std::path::{Path, PathBuf};

/// Stage each path in order, stopping at the first failure.
pub fn execute_stage(root: &Path, paths: Vec<PathBuf>) -> Result<()> {
    let repo = Repository::open(root)?;

    for path in paths {
        let entry = repo.stage(&path)?;
        print_success(&format!(
            "Staged {} ({})",
            entry.filename,
            format_size(entry.size)
        ));
    }

    Ok(())
}
