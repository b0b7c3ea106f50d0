use crate::core::{
    error::Result, format_size, print_info, print_section_header, Repository,
};
use colored::*;
use std::path::Path;

pub fn execute_status(root: &Path) -> Result<()> {
    let repo = Repository::open(root)?;
    let metadata = repo.metadata()?;

    if metadata.staged.is_empty() {
        print_info("Nothing staged");
    } else {
        print_section_header("Staged files");
        for entry in &metadata.staged {
            println!(
                "  {}  {}  {}",
                entry.filename.green(),
                format_size(entry.size).bright_black(),
                entry.staged_at.format("%Y-%m-%d %H:%M:%S").to_string().bright_black()
            );
            println!("    {}", entry.original_path.display().to_string().bright_black());
        }
        println!();
    }

    let latest = metadata
        .latest_commit()
        .map(|c| format!(", latest {}", c.id))
        .unwrap_or_default();
    println!("{} commit(s){latest}\n", metadata.commits.len());
    Ok(())
}
