use std::path::Path;

use owo_colors::OwoColorize;

/// Prints `pagekit <command>` and the project it runs against.
pub fn print_command_header(command: &str, root: &Path) {
    println!("{} {}", "pagekit".cyan().bold(), command.cyan().bold());
    println!("  {}", root.display().bright_black());
    println!();
}
