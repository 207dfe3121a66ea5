//! Output formatting utilities.

use missive_core::ValidationIssue;
use serde::Serialize;

use crate::error::CliError;

/// Pretty JSON for anything serializable.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Prints issues as a table.
#[allow(clippy::print_literal)]
pub fn print_issues(issues: &[ValidationIssue]) {
    println!("{:<28} {:<16} {}", "PATH", "CODE", "MESSAGE");
    println!("{}", "-".repeat(80));
    for issue in issues {
        println!(
            "{:<28} {:<16} {}",
            truncate(&issue.path, 28),
            issue.code.as_str(),
            issue.message
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
