use std::path::{Path, PathBuf};

use crate::config::{BackupLocation, MonitoringConfig};

/// Limits and exclusions applied while scanning one location.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Window in days for the recent-activity flag
    pub days_back: i64,

    /// Maximum depth below the location root (root itself is depth 0)
    pub max_depth: usize,

    /// Maximum number of directory entries before truncation
    pub max_dirs: usize,

    /// Path prefixes pruned from the traversal
    pub exclude_patterns: Vec<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let monitoring = MonitoringConfig::default();
        Self {
            days_back: monitoring.days_back,
            max_depth: monitoring.max_depth,
            max_dirs: monitoring.max_dirs,
            exclude_patterns: Vec::new(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for one configured location, honoring its depth override.
    pub fn for_location(location: &BackupLocation, monitoring: &MonitoringConfig) -> Self {
        Self {
            days_back: monitoring.days_back,
            max_depth: location.effective_max_depth(monitoring),
            max_dirs: monitoring.max_dirs,
            exclude_patterns: location.exclude_patterns.clone(),
        }
    }

    pub fn with_days_back(mut self, days: i64) -> Self {
        self.days_back = days;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_dirs(mut self, max: usize) -> Self {
        self.max_dirs = max;
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<PathBuf>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Prefix match against the exclusion list.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_patterns
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}
