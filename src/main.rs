use anyhow::Result;
use clap::{CommandFactory, Parser};

use backup_monitor::cli::{Cli, Command};
use backup_monitor::commands;
use backup_monitor::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    // Completions don't need a config file
    if let Command::Completions(args) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "backup-monitor", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    tracing::debug!(locations = config.backup_locations.len(), "Loaded configuration");

    // Dispatch to subcommand
    match cli.command {
        Command::ValidateConfig(args) => {
            tracing::info!(?args, "Validating configuration");
            commands::validate_config::run(args, &config)?;
        }
        Command::Scan(args) => {
            tracing::info!(?args, "Starting scan");
            commands::scan::run(args, &config)?;
        }
        Command::Report(args) => {
            tracing::info!(?args, "Building report");
            commands::report::run(args, &config)?;
        }
        Command::Overview(args) => {
            tracing::info!(?args, "Building overview");
            commands::overview::run(args, &config)?;
        }
        Command::TestEmail(args) => {
            tracing::info!(?args, "Sending test email");
            commands::test_email::run(args, &config)?;
        }
        Command::Completions(_) => unreachable!("handled above"),
    }

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("backup_monitor={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
