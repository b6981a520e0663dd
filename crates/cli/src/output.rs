//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use clarity_core::error::Error;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.len()));
    }
}

/// Print a structured error with its context and recovery suggestion
pub fn print_error(error: &Error) {
    Status::error(&format!("{} {}", error.code.to_string().dimmed(), error.message));
    if let Some(ref context) = error.context {
        eprintln!("  {}", context.dimmed());
    }
    if let Some(ref suggestion) = error.suggestion {
        eprintln!("  {} {}", "→".cyan(), suggestion);
    }
}

/// Print an aligned key/value detail line
pub fn key_value(key: &str, value: &str) {
    println!("  {:<18} {}", format!("{}:", key).dimmed(), value);
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Format an on/off flag for display
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "enabled"
    } else {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "capability", "capabilities"), "1 capability");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(5, "capability", "capabilities"), "5 capabilities");
    }

    #[test]
    fn test_format_flag() {
        assert_eq!(format_flag(true), "enabled");
        assert_eq!(format_flag(false), "disabled");
    }
}
