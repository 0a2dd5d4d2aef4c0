//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rankings Report - Explore and edit a university rankings database
#[derive(Parser, Debug)]
#[command(name = "rankings-report")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config.toml file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Rankings table name (overrides config)
    #[arg(long, global = true, value_name = "NAME")]
    pub table: Option<String>,

    /// Command to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the exploration reports followed by the insert/read/update/delete steps
    Run {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run only the read-only exploration reports
    Report {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List the steps of a run without touching the database
    Steps,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_is_allowed() {
        let cli = Cli::try_parse_from(["rankings-report"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "rankings-report",
            "report",
            "--db",
            "rankings.db",
            "--table",
            "rankings",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("rankings.db")));
        assert_eq!(cli.table.as_deref(), Some("rankings"));
        assert_eq!(
            cli.command,
            Some(Commands::Report {
                format: "json".to_string()
            })
        );
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
