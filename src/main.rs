//! Rankings Report CLI
//!
//! Runs exploratory reports and verified edits against a university rankings database.

use clap::Parser;
use rankings_report::cli::{
    args::{Cli, Commands},
    commands::{run, steps},
};
use rankings_report::models::config;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?
        .with_overrides(cli.db.as_deref(), cli.table.as_deref());
    config.table.validate()?;

    // Run the appropriate command
    match cli.command.unwrap_or_default() {
        Commands::Run { format } => {
            run::run(&config, &format)?;
        }
        Commands::Report { format } => {
            run::report(&config, &format)?;
        }
        Commands::Steps => {
            steps::steps(&config)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("rankings_report=debug")
    } else {
        EnvFilter::new("rankings_report=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
