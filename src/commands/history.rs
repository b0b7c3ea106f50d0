use crate::core::{error::Result, print_info, Repository};
use colored::*;
use std::path::Path;

/// Print commits newest first.
pub fn execute_history(root: &Path) -> Result<()> {
    let repo = Repository::open(root)?;
    let metadata = repo.metadata()?;

    if metadata.commits.is_empty() {
        print_info("No commits yet");
        return Ok(());
    }

    println!();
    for commit in metadata.commits.iter().rev() {
        println!("{} {}", "commit".yellow(), commit.id.yellow());
        println!(
            "{}",
            commit
                .committed_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .bright_black()
        );
        println!("\n    {}\n", commit.message.white());
        for file in &commit.files {
            println!("    {}", file.entry.filename.bright_black());
        }
        println!();
    }
    Ok(())
}
