mod entry;
mod options;
mod walker;

pub use entry::{DirectoryEntry, ScanResult};
pub use options::ScanOptions;
pub use walker::{scan_all_locations, scan_location};
