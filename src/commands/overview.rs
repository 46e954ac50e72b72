//! Overview command implementation

use chrono::Local;
use humansize::{format_size, BINARY};

use crate::cli::OverviewArgs;
use crate::config::Config;
use crate::error::Result;
use crate::scanner::{scan_all_locations, ScanResult};

/// Print a one-line activity summary per configured location.
pub fn run(_args: OverviewArgs, config: &Config) -> Result<()> {
    let now = Local::now();
    let results = scan_all_locations(config, now);

    for result in &results {
        println!("{}", summary_line(result));
    }

    Ok(())
}

fn summary_line(result: &ScanResult) -> String {
    let status = if result.directories_found.is_empty() {
        "NO DATA".to_string()
    } else if let Some(latest) = result.most_recent() {
        if result.has_recent_activity() {
            format!("latest {}", latest.last_modified.format("%Y-%m-%d %H:%M"))
        } else {
            format!(
                "STALE, latest {}",
                latest.last_modified.format("%Y-%m-%d %H:%M")
            )
        }
    } else {
        "NO DATA".to_string()
    };

    format!(
        "{:<20} {:>4} dirs {:>6} files {:>10}  {}{}",
        result.location_name,
        result.directories_found.len(),
        result.total_files(),
        format_size(result.total_size(), BINARY),
        status,
        if result.errors.is_empty() {
            String::new()
        } else {
            format!("  ({} errors)", result.errors.len())
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    #[test]
    fn line_marks_stale_locations() {
        let mut result = ScanResult::new("offsite");
        result.directories_found.push(crate::scanner::DirectoryEntry {
            path: PathBuf::from("/backup/offsite"),
            last_modified: Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            file_count: 1,
            subdirectory_count: 0,
            total_size: 100,
            most_recent_file: None,
            recent_activity: false,
        });

        let line = summary_line(&result);
        assert!(line.contains("offsite"));
        assert!(line.contains("STALE"));
    }

    #[test]
    fn line_reports_missing_data() {
        let result = ScanResult::new("empty");
        assert!(summary_line(&result).contains("NO DATA"));
    }
}
