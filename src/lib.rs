//! Backup Monitor - backup directory activity monitoring
//!
//! This crate provides functionality for:
//! - Scanning configured backup locations with depth/count/exclusion limits
//! - Classifying per-directory activity (recency, file counts, sizes)
//! - Building matching HTML and plain-text reports and emailing them

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use error::{MonitorError, Result};
