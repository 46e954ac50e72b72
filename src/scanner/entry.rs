use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// Per-directory activity record produced by the scanner.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    /// Full path to the directory
    pub path: PathBuf,

    /// Most recent mtime among immediate files, or the directory's own
    /// mtime when it holds no files
    pub last_modified: DateTime<Local>,

    /// Number of immediate files
    pub file_count: u64,

    /// Number of immediate subdirectories
    pub subdirectory_count: u64,

    /// Aggregate size of immediate files in bytes
    pub total_size: u64,

    /// Name of the most recently modified immediate file, if any
    pub most_recent_file: Option<String>,

    /// True if last_modified falls within the configured days_back window
    pub recent_activity: bool,
}

/// Outcome of scanning one backup location. Per-directory failures are
/// collected in `errors`; they never abort the scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub location_name: String,

    /// Entries in deterministic traversal order (lexical depth-first)
    pub directories_found: Vec<DirectoryEntry>,

    /// True when the scan stopped early at the max_dirs limit
    pub truncated: bool,

    /// Per-directory I/O failures, each naming the offending path
    pub errors: Vec<String>,
}

impl ScanResult {
    pub fn new(location_name: impl Into<String>) -> Self {
        Self {
            location_name: location_name.into(),
            directories_found: Vec::new(),
            truncated: false,
            errors: Vec::new(),
        }
    }

    /// True if any scanned directory saw activity within the window.
    pub fn has_recent_activity(&self) -> bool {
        self.directories_found.iter().any(|e| e.recent_activity)
    }

    /// The most recently modified entry, ties broken by lexical path order.
    pub fn most_recent(&self) -> Option<&DirectoryEntry> {
        self.directories_found
            .iter()
            .min_by(|a, b| {
                b.last_modified
                    .cmp(&a.last_modified)
                    .then_with(|| a.path.cmp(&b.path))
            })
    }

    pub fn total_files(&self) -> u64 {
        self.directories_found.iter().map(|e| e.file_count).sum()
    }

    pub fn total_size(&self) -> u64 {
        self.directories_found.iter().map(|e| e.total_size).sum()
    }
}
