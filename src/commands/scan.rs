//! Scan command implementation

use chrono::Local;
use humansize::{format_size, BINARY};

use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::scanner::{scan_all_locations, scan_location, ScanOptions, ScanResult};

/// Run the scan command
pub fn run(args: ScanArgs, config: &Config) -> Result<()> {
    let now = Local::now();

    let results = match &args.location {
        Some(name) => {
            let location = config
                .location(name)
                .ok_or_else(|| MonitorError::UnknownLocation(name.clone()))?;
            let options = ScanOptions::for_location(location, &config.monitoring);
            vec![scan_location(location, &options, now)]
        }
        None => scan_all_locations(config, now),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print!("{}", format_results(&results));
    Ok(())
}

fn format_results(results: &[ScanResult]) -> String {
    let mut out = String::new();

    for result in results {
        out.push_str(&format!("LOCATION: {}\n", result.location_name));

        if result.directories_found.is_empty() {
            out.push_str("  no directories found\n");
        } else {
            out.push_str(&format!(
                "  {:<50} {:>7} {:>10} {:>7}  {}\n",
                "Directory", "Files", "Size", "Recent", "Modified"
            ));
            for entry in &result.directories_found {
                out.push_str(&format!(
                    "  {:<50} {:>7} {:>10} {:>7}  {}\n",
                    entry.path.display(),
                    entry.file_count,
                    format_size(entry.total_size, BINARY),
                    if entry.recent_activity { "yes" } else { "no" },
                    entry.last_modified.format("%Y-%m-%d %H:%M")
                ));
            }
        }

        if result.truncated {
            out.push_str("  (truncated: directory limit reached)\n");
        }
        for error in &result.errors {
            out.push_str(&format!("  ERROR: {}\n", error));
        }

        out.push_str(&format!(
            "  Total: {} directories, {} files, {}\n\n",
            result.directories_found.len(),
            result.total_files(),
            format_size(result.total_size(), BINARY)
        ));
    }

    out
}
