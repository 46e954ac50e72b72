use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Root configuration structure, loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backup_locations: Vec<BackupLocation>,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// One configured root directory to monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupLocation {
    /// Display name used in reports
    pub name: String,
    /// Root directory to scan
    pub path: PathBuf,
    /// Path prefixes to prune from the scan
    #[serde(default)]
    pub exclude_patterns: Vec<PathBuf>,
    /// Per-location depth override (falls back to monitoring.max_depth)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Maximum depth to scan below each location root
    pub max_depth: usize,
    /// Window in days for the recent-activity flag
    pub days_back: i64,
    /// Maximum number of directory entries per location
    pub max_dirs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_pass: Option<String>,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    /// Use STARTTLS when connecting
    #[serde(default = "default_true")]
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory where `report --save` writes generated reports
    pub directory: PathBuf,
    /// Saved reports older than this many days are pruned
    pub retention_days: u32,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            days_back: 7,
            max_dirs: 200,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("reports"),
            retention_days: 30,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or the first default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => p.to_path_buf(),
            None => Self::find_default()?,
        };

        let raw = std::fs::read_to_string(&file).map_err(|e| ConfigError::ReadError {
            path: file.clone(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: file.clone(),
            source: e,
        })?;

        config.validate()?;

        tracing::debug!(path = %file.display(), "Configuration loaded");
        Ok(config)
    }

    /// Candidate config file locations, in lookup order.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from("config.yaml"), PathBuf::from("config.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("backup-monitor/config.yaml"));
            candidates.push(config_dir.join("backup-monitor/config.yml"));
        }
        candidates.push(PathBuf::from("/etc/backup-monitor/config.yaml"));
        candidates.push(PathBuf::from("/etc/backup-monitor/config.yml"));
        candidates
    }

    fn find_default() -> Result<PathBuf> {
        let candidates = Self::default_locations();
        for candidate in &candidates {
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }
        Err(ConfigError::NotFound {
            searched: candidates,
        }
        .into())
    }

    /// Check invariants the scanner and reporter rely on.
    pub fn validate(&self) -> Result<()> {
        if self.backup_locations.is_empty() {
            return Err(invalid("at least one backup location must be configured"));
        }

        let mut names = std::collections::HashSet::new();
        for location in &self.backup_locations {
            if location.name.trim().is_empty() {
                return Err(invalid("backup location name cannot be empty"));
            }
            if location.path.as_os_str().is_empty() {
                return Err(invalid(format!(
                    "backup location '{}' has an empty path",
                    location.name
                )));
            }
            if !names.insert(location.name.as_str()) {
                return Err(invalid(format!(
                    "duplicate backup location name: {}",
                    location.name
                )));
            }
        }

        if self.monitoring.max_depth == 0 {
            return Err(invalid("monitoring.max_depth must be positive"));
        }
        if self.monitoring.days_back <= 0 {
            return Err(invalid("monitoring.days_back must be positive"));
        }
        if self.monitoring.max_dirs == 0 {
            return Err(invalid("monitoring.max_dirs must be positive"));
        }

        if let Some(email) = &self.email {
            email.validate()?;
        }

        Ok(())
    }

    /// Find a configured location by name.
    pub fn location(&self, name: &str) -> Option<&BackupLocation> {
        self.backup_locations.iter().find(|l| l.name == name)
    }
}

impl EmailConfig {
    fn validate(&self) -> Result<()> {
        if self.smtp_server.trim().is_empty() {
            return Err(invalid("email.smtp_server cannot be empty"));
        }
        if self.smtp_port == 0 {
            return Err(invalid("email.smtp_port must be between 1 and 65535"));
        }
        if !looks_like_address(&self.from_address) {
            return Err(invalid(format!(
                "invalid email.from_address: {}",
                self.from_address
            )));
        }
        if self.to_addresses.is_empty() {
            return Err(invalid("email.to_addresses must be a non-empty list"));
        }
        for addr in &self.to_addresses {
            if !looks_like_address(addr) {
                return Err(invalid(format!("invalid recipient address: {}", addr)));
            }
        }
        Ok(())
    }
}

impl BackupLocation {
    /// Effective depth limit, honoring the per-location override.
    pub fn effective_max_depth(&self, monitoring: &MonitoringConfig) -> usize {
        self.max_depth.unwrap_or(monitoring.max_depth)
    }
}

fn invalid(msg: impl Into<String>) -> crate::error::MonitorError {
    ConfigError::Invalid(msg.into()).into()
}

/// Cheap structural check; lettre does the real parsing at send time.
fn looks_like_address(addr: &str) -> bool {
    let Some((local, domain)) = addr.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
