//! Validate-config command implementation

use crate::cli::ValidateConfigArgs;
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Print the effective configuration. The file itself was already parsed
/// and validated during load; `--check-paths` additionally requires every
/// location root to be a readable directory.
pub fn run(args: ValidateConfigArgs, config: &Config) -> Result<()> {
    println!("Configuration is valid");
    println!();
    println!(
        "Monitoring: max_depth={} days_back={} max_dirs={}",
        config.monitoring.max_depth, config.monitoring.days_back, config.monitoring.max_dirs
    );
    println!(
        "Email: {}",
        match &config.email {
            Some(email) => format!(
                "{}:{} -> {} recipient(s)",
                email.smtp_server,
                email.smtp_port,
                email.to_addresses.len()
            ),
            None => "not configured".to_string(),
        }
    );
    println!();
    println!("Backup locations:");

    let mut unreachable = Vec::new();
    for location in &config.backup_locations {
        let status = match std::fs::read_dir(&location.path) {
            Ok(_) => "ok",
            Err(_) => {
                unreachable.push(location.name.clone());
                "NOT ACCESSIBLE"
            }
        };
        println!(
            "  {:<20} {} (max_depth={}, {} exclusions) [{}]",
            location.name,
            location.path.display(),
            location.effective_max_depth(&config.monitoring),
            location.exclude_patterns.len(),
            status
        );
    }

    if !unreachable.is_empty() {
        if args.check_paths {
            return Err(ConfigError::Invalid(format!(
                "inaccessible backup locations: {}",
                unreachable.join(", ")
            ))
            .into());
        }
        tracing::warn!(
            locations = unreachable.join(", "),
            "Some backup locations are not accessible"
        );
    }

    Ok(())
}
