use chrono::{DateTime, Local};
use humansize::{format_size, BINARY};

use crate::scanner::ScanResult;

use super::summary::ReportSummary;
use super::{is_stale, sorted_entries};

const RULE: &str =
    "================================================================================";

/// Render the plain-text report. Carries exactly the same data as the HTML
/// rendering.
pub(super) fn render(
    results: &[ScanResult],
    summary: &ReportSummary,
    days_back: i64,
    generated_at: DateTime<Local>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(RULE.to_string());
    lines.push("                    BACKUP DIRECTORY MONITORING REPORT".to_string());
    lines.push(format!(
        "                          Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(RULE.to_string());
    lines.push(String::new());

    lines.push("SUMMARY".to_string());
    lines.push("=======".to_string());
    lines.push(format!(
        "Backup locations monitored: {}",
        summary.total_locations
    ));
    lines.push(format!(
        "Total directories scanned:  {}",
        summary.total_directories
    ));
    lines.push(format!("Total files found:          {}", summary.total_files));
    lines.push(format!(
        "Total size:                 {}",
        format_size(summary.total_size, BINARY)
    ));
    lines.push(format!(
        "Recent activity (last {} days): {} directories",
        days_back, summary.recent_directories
    ));
    if !summary.stale_locations.is_empty() {
        lines.push(format!(
            "STALE locations:            {}",
            summary.stale_locations.join(", ")
        ));
    }
    lines.push(String::new());

    for result in results {
        let marker = if is_stale(result) { " [STALE]" } else { "" };
        let heading = format!("LOCATION: {}{}", result.location_name, marker);
        lines.push(heading.clone());
        lines.push("=".repeat(heading.len()));

        if result.directories_found.is_empty() {
            lines.push("No directories found or scan failed.".to_string());
        } else {
            lines.push(format!(
                "{:<44} {:>7} {:>9} {:>8} {:<24} {:<17}",
                "Directory", "Files", "Size", "Recent", "Latest File", "Modified"
            ));
            lines.push(format!(
                "{} {} {} {} {} {}",
                "-".repeat(44),
                "-".repeat(7),
                "-".repeat(9),
                "-".repeat(8),
                "-".repeat(24),
                "-".repeat(17)
            ));

            for entry in sorted_entries(result) {
                let latest = entry
                    .most_recent_file
                    .clone()
                    .unwrap_or_else(|| "(no files)".to_string());
                lines.push(format!(
                    "{:<44} {:>7} {:>9} {:>8} {:<24} {:<17}",
                    truncate(&entry.path.display().to_string(), 44),
                    entry.file_count,
                    format_size(entry.total_size, BINARY),
                    if entry.recent_activity { "yes" } else { "no" },
                    truncate(&latest, 24),
                    entry.last_modified.format("%Y-%m-%d %H:%M")
                ));
            }
        }

        if result.truncated {
            lines.push("(truncated: directory limit reached)".to_string());
        }
        for error in &result.errors {
            lines.push(format!("ERROR: {}", error));
        }
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.push("Generated by backup-monitor".to_string());
    lines.push(RULE.to_string());

    lines.join("\n")
}

/// Truncate long cell values, keeping the head.
fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
    format!("{}...", kept)
}
