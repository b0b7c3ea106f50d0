use crate::core::{error::Result, print_success, Repository};
use colored::*;
use std::path::Path;

pub fn execute_commit(root: &Path, message: &str) -> Result<()> {
    let repo = Repository::open(root)?;
    let id = repo.commit(message)?;

    let file_count = repo
        .metadata()?
        .find_commit(&id)
        .map(|c| c.files.len())
        .unwrap_or_default();

    print_success(&format!("Committed {file_count} file(s)"));
    println!("  {} {}", "id:".bright_black(), id.white());
    println!("  {} {}\n", "message:".bright_black(), message.trim().white());
    Ok(())
}
