use chrono::{DateTime, Local};
use humansize::{format_size, BINARY};

use crate::scanner::ScanResult;

use super::summary::ReportSummary;
use super::{is_stale, sorted_entries};

const STYLE: &str = r#"
    body { font-family: 'Segoe UI', Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
    .container { max-width: 900px; margin: 0 auto; background-color: white; border-radius: 8px; padding: 24px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    h1 { font-size: 20px; border-bottom: 2px solid #2c7be5; padding-bottom: 8px; }
    h2 { font-size: 16px; margin-top: 28px; }
    h2.stale { color: #b02a37; }
    .stale-badge { background-color: #b02a37; color: white; border-radius: 4px; padding: 2px 8px; font-size: 12px; margin-left: 8px; }
    table { border-collapse: collapse; width: 100%; font-size: 13px; }
    th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #e0e0e0; }
    th { background-color: #f0f4f8; }
    tr.recent td { background-color: #eaf7ea; }
    .summary td { border: none; padding: 2px 10px; }
    .error { color: #b02a37; font-size: 13px; }
    .note { color: #6c757d; font-size: 13px; }
    .footer { margin-top: 28px; color: #6c757d; font-size: 12px; text-align: center; }
"#;

/// Render the HTML report. Carries exactly the same data as the text
/// rendering.
pub(super) fn render(
    results: &[ScanResult],
    summary: &ReportSummary,
    days_back: i64,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Backup Directory Monitoring Report</title>\n");
    out.push_str(&format!("<style>{}</style>\n", STYLE));
    out.push_str("</head>\n<body>\n<div class=\"container\">\n");

    out.push_str("<h1>Backup Directory Monitoring Report</h1>\n");
    out.push_str(&format!(
        "<p class=\"note\">Generated: {}</p>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str("<table class=\"summary\">\n");
    summary_row(&mut out, "Backup locations monitored", &summary.total_locations.to_string());
    summary_row(&mut out, "Total directories scanned", &summary.total_directories.to_string());
    summary_row(&mut out, "Total files found", &summary.total_files.to_string());
    summary_row(&mut out, "Total size", &format_size(summary.total_size, BINARY));
    summary_row(
        &mut out,
        &format!("Recent activity (last {} days)", days_back),
        &format!("{} directories", summary.recent_directories),
    );
    if !summary.stale_locations.is_empty() {
        summary_row(
            &mut out,
            "STALE locations",
            &escape(&summary.stale_locations.join(", ")),
        );
    }
    out.push_str("</table>\n");

    for result in results {
        let stale = is_stale(result);
        if stale {
            out.push_str(&format!(
                "<h2 class=\"stale\">{}<span class=\"stale-badge\">STALE</span></h2>\n",
                escape(&result.location_name)
            ));
        } else {
            out.push_str(&format!("<h2>{}</h2>\n", escape(&result.location_name)));
        }

        if result.directories_found.is_empty() {
            out.push_str("<p class=\"note\">No directories found or scan failed.</p>\n");
        } else {
            out.push_str("<table>\n<tr><th>Directory</th><th>Files</th><th>Size</th><th>Recent</th><th>Latest File</th><th>Modified</th></tr>\n");
            for entry in sorted_entries(result) {
                let latest = entry
                    .most_recent_file
                    .clone()
                    .unwrap_or_else(|| "(no files)".to_string());
                out.push_str(&format!(
                    "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    if entry.recent_activity { " class=\"recent\"" } else { "" },
                    escape(&entry.path.display().to_string()),
                    entry.file_count,
                    format_size(entry.total_size, BINARY),
                    if entry.recent_activity { "yes" } else { "no" },
                    escape(&latest),
                    entry.last_modified.format("%Y-%m-%d %H:%M")
                ));
            }
            out.push_str("</table>\n");
        }

        if result.truncated {
            out.push_str("<p class=\"note\">(truncated: directory limit reached)</p>\n");
        }
        for error in &result.errors {
            out.push_str(&format!("<p class=\"error\">ERROR: {}</p>\n", escape(error)));
        }
    }

    out.push_str("<div class=\"footer\">Generated by backup-monitor</div>\n");
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

fn summary_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<tr><td>{}:</td><td><b>{}</b></td></tr>\n",
        label, value
    ));
}

/// Minimal HTML escaping for untrusted path and file names.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
