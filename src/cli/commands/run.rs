//! Run and report command implementations.
//!
//! Opens the configured database, executes a plan and releases the
//! connection whether or not the plan succeeded.

use crate::core::printer::{OutputFormat, Printer};
use crate::core::runner::Runner;
use crate::core::store::RankingStore;
use crate::models::config::Config;
use crate::models::plan::RunPlan;
use crate::models::report::RunSummary;
use crate::utils::fs;
use crate::{Error, Result};
use std::io::Write;
use std::path::PathBuf;

/// Run the full reporting and mutation sequence.
pub fn run(config: &Config, format: &str) -> Result<RunSummary> {
    let format: OutputFormat = format.parse()?;
    let stdout = std::io::stdout();
    let mut printer = Printer::new(stdout.lock(), format);
    printer.print_banner("RANKINGS REPORT")?;
    execute_plan(config, &RunPlan::standard(), &mut printer)
}

/// Run only the read-only exploration reports.
pub fn report(config: &Config, format: &str) -> Result<RunSummary> {
    let format: OutputFormat = format.parse()?;
    let plan = RunPlan::exploration();
    if !plan.is_read_only() {
        return Err(Error::other("Exploration plan contains write steps"));
    }
    let stdout = std::io::stdout();
    let mut printer = Printer::new(stdout.lock(), format);
    printer.print_banner("INITIAL DATA EXPLORATION")?;
    execute_plan(config, &plan, &mut printer)
}

/// Open the database, run `plan` and close the connection on every exit path.
pub fn execute_plan<W: Write>(
    config: &Config,
    plan: &RunPlan,
    printer: &mut Printer<W>,
) -> Result<RunSummary> {
    let db_path = database_path(config)?;
    tracing::info!("Database: {}", db_path.display());

    let store = RankingStore::open(&db_path, config.table.clone())?;
    let outcome = Runner::new(&store).run(plan, printer);
    let closed = store.close();

    let (_, summary) = outcome?;
    closed?;
    Ok(summary)
}

/// The configured database path, resolved against the working directory.
pub fn database_path(config: &Config) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(fs::resolve_path(&cwd, &config.database.path))
}
