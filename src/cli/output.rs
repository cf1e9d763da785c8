//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;

use crate::application::services::Stage;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Pipeline stage line: `EDITING: <path>`, `WRITING: <path>`, `DONE: <path>`
pub fn stage(stage: Stage, path: &(impl Display + ?Sized)) {
    let label = match stage {
        Stage::Done => stage.to_string().green().bold(),
        _ => stage.to_string().cyan(),
    };
    println!("{}: {}", label, path);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Parameter or component that will be set (green +)
pub fn added(msg: &(impl Display + ?Sized)) {
    println!("  {} {}", "+".green(), msg);
}

/// Parameter or component that will be dropped (red -)
pub fn removed(msg: &(impl Display + ?Sized)) {
    println!("  {} {}", "-".red(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for XML and TOML dumps)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
