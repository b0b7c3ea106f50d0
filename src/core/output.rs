//! Unified output formatting utilities for consistent CLI presentation.
//!
//! Every command prints through these helpers so errors, warnings and
//! results share one color scheme and one spacing convention.
//!
//! # Design Principles
//! - **Consistent color scheme**: red for errors, yellow for warnings, green for success
//! - **Standardized spacing**: newline before every block of command output
//! - **Muted detail**: paths, sizes and timestamps in bright_black

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
///
/// # Colors
/// - "✕ Error:" in red
/// - Message in white
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a warning that does not fail the command
///
/// # Format
/// ```text
///
/// ! Warning: <message>
/// ```
pub fn print_warning(message: &str) {
    eprintln!("\n{} {}", "! Warning:".yellow(), message.white());
}

/// Formats and prints a success message with consistent styling
///
/// # Format
/// ```text
///
/// ✓ <message>
/// ```
///
/// # Colors
/// - Checkmark in green, message in white
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

/// Formats and prints an informational message with consistent styling
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// One line of a per-item result list: `  ✓ <label>` or `  ✕ <label>  <detail>`.
pub fn print_item_result(ok: bool, label: &str, detail: Option<&str>) {
    let marker = if ok { "✓".green() } else { "✕".red() };
    match detail {
        Some(detail) => println!("  {} {}  {}", marker, label.white(), detail.bright_black()),
        None => println!("  {} {}", marker, label.white()),
    }
}

/// Human-readable byte count: `512 B`, `1.5 KiB`, `3.0 MiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
