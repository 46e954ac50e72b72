use serde::Serialize;

use crate::scanner::ScanResult;

use super::is_stale;

/// Aggregate totals across every scanned location.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_locations: usize,
    pub total_directories: usize,
    pub total_files: u64,
    pub total_size: u64,
    /// Directories with activity inside the days_back window
    pub recent_directories: usize,
    /// Names of locations with no recent activity at all
    pub stale_locations: Vec<String>,
    pub error_count: usize,
    pub truncated_locations: Vec<String>,
}

pub fn summarize(results: &[ScanResult]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_locations: results.len(),
        total_directories: 0,
        total_files: 0,
        total_size: 0,
        recent_directories: 0,
        stale_locations: Vec::new(),
        error_count: 0,
        truncated_locations: Vec::new(),
    };

    for result in results {
        summary.total_directories += result.directories_found.len();
        summary.total_files += result.total_files();
        summary.total_size += result.total_size();
        summary.recent_directories += result
            .directories_found
            .iter()
            .filter(|e| e.recent_activity)
            .count();
        summary.error_count += result.errors.len();

        if is_stale(result) {
            summary.stale_locations.push(result.location_name.clone());
        }
        if result.truncated {
            summary.truncated_locations.push(result.location_name.clone());
        }
    }

    summary
}
