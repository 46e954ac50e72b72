mod html;
mod mailer;
mod summary;
mod text;

pub use mailer::EmailReporter;
pub use summary::{summarize, ReportSummary};

use chrono::{DateTime, Local};

use crate::scanner::{DirectoryEntry, ScanResult};

/// Matching HTML and plain-text renderings of one scan. Both carry the
/// same locations, entries, and staleness flags.
#[derive(Debug, Clone)]
pub struct Report {
    pub html: String,
    pub text: String,
}

/// Build both report formats from a set of scan results.
///
/// `generated_at` is injected rather than read from the wall clock so the
/// output is reproducible.
pub fn build_report(
    results: &[ScanResult],
    days_back: i64,
    generated_at: DateTime<Local>,
) -> Report {
    let summary = summarize(results);
    Report {
        html: html::render(results, &summary, days_back, generated_at),
        text: text::render(results, &summary, days_back, generated_at),
    }
}

/// Entries sorted most recently active first, ties broken by lexical path.
pub(crate) fn sorted_entries(result: &ScanResult) -> Vec<&DirectoryEntry> {
    let mut entries: Vec<&DirectoryEntry> = result.directories_found.iter().collect();
    entries.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.path.cmp(&b.path))
    });
    entries
}

/// A location is stale when nothing inside it changed within the window.
pub(crate) fn is_stale(result: &ScanResult) -> bool {
    !result.has_recent_activity()
}
