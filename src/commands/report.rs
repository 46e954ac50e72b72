//! Report command implementation

use chrono::{DateTime, Duration, Local};
use std::fs;
use std::path::Path;

use crate::cli::ReportArgs;
use crate::config::{Config, ReportsConfig};
use crate::error::{DeliveryError, MonitorError, Result};
use crate::report::{build_report, summarize, EmailReporter, Report};
use crate::scanner::scan_all_locations;

/// Run the report command
pub fn run(args: ReportArgs, config: &Config) -> Result<()> {
    let now = Local::now();
    let results = scan_all_locations(config, now);
    let report = build_report(&results, config.monitoring.days_back, now);

    let mut handled = false;

    if args.email {
        let email = config
            .email
            .clone()
            .ok_or(DeliveryError::NotConfigured)?;

        let summary = summarize(&results);
        let subject = if summary.stale_locations.is_empty() {
            format!("Backup Report {}", now.format("%Y-%m-%d"))
        } else {
            format!(
                "Backup Report {} - {} stale location(s)",
                now.format("%Y-%m-%d"),
                summary.stale_locations.len()
            )
        };

        EmailReporter::new(email).send_report(&subject, &report)?;
        handled = true;
    }

    if args.save {
        save_reports(&report, &config.reports, now)?;
        handled = true;
    }

    if !handled || args.text_only {
        println!("{}", report.text);
    }

    Ok(())
}

/// Write both renderings under the reports directory and prune old ones.
fn save_reports(report: &Report, config: &ReportsConfig, now: DateTime<Local>) -> Result<()> {
    fs::create_dir_all(&config.directory).map_err(|e| MonitorError::Io {
        path: config.directory.clone(),
        source: e,
    })?;

    let stamp = now.format("%Y%m%d_%H%M%S");
    let text_path = config.directory.join(format!("backup_report_{}.txt", stamp));
    let html_path = config.directory.join(format!("backup_report_{}.html", stamp));

    fs::write(&text_path, &report.text).map_err(|e| MonitorError::Io {
        path: text_path.clone(),
        source: e,
    })?;
    fs::write(&html_path, &report.html).map_err(|e| MonitorError::Io {
        path: html_path.clone(),
        source: e,
    })?;

    tracing::info!(
        text = %text_path.display(),
        html = %html_path.display(),
        "Reports saved"
    );

    prune_old_reports(&config.directory, config.retention_days, now);
    Ok(())
}

/// Delete saved reports older than the retention window. Failures here are
/// logged, never fatal.
fn prune_old_reports(directory: &Path, retention_days: u32, now: DateTime<Local>) {
    let cutoff = now - Duration::days(retention_days as i64);

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %directory.display(), error = %e, "Cannot prune old reports");
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("backup_report_") {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(DateTime::<Local>::from);
        if let Ok(modified) = modified {
            if modified < cutoff {
                if let Err(e) = fs::remove_file(entry.path()) {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Failed to prune report");
                } else {
                    tracing::debug!(path = %entry.path().display(), "Pruned old report");
                }
            }
        }
    }
}
