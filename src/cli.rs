use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Backup Monitor - backup directory activity monitoring
#[derive(Parser, Debug)]
#[command(name = "backup-monitor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the configuration file and backup location paths
    ValidateConfig(ValidateConfigArgs),

    /// Scan all backup locations and print per-directory statistics
    Scan(ScanArgs),

    /// Scan, build the HTML/text report, and optionally email or save it
    Report(ReportArgs),

    /// Print a one-line activity summary per backup location
    Overview(OverviewArgs),

    /// Send a test email to verify SMTP settings
    TestEmail(TestEmailArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct ValidateConfigArgs {
    /// Also verify that every location path exists and is readable
    #[arg(long)]
    pub check_paths: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Only scan the named location
    #[arg(short, long, value_name = "NAME")]
    pub location: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Send the report by email
    #[arg(short, long)]
    pub email: bool,

    /// Save the HTML and text reports under the configured reports directory
    #[arg(short, long)]
    pub save: bool,

    /// Print only the plain-text report (default when neither --email nor --save)
    #[arg(long)]
    pub text_only: bool,
}

#[derive(Args, Debug)]
pub struct OverviewArgs {}

#[derive(Args, Debug)]
pub struct TestEmailArgs {
    /// Override the test email subject
    #[arg(long, default_value = "Backup Monitor Test Email", value_name = "SUBJECT")]
    pub subject: String,
}
