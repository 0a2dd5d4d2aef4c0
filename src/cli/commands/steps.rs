//! Steps command implementation.
//!
//! Lists the steps of the standard run without opening the database.

use crate::core::queries::quote_ident;
use crate::models::config::Config;
use crate::models::plan::RunPlan;
use crate::Result;
use colored::Colorize;
use std::io::Write;

/// List the steps of the standard run.
pub fn steps(config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    list_steps(config, &RunPlan::standard(), &mut out)
}

/// Write a plan listing to `out`.
pub fn list_steps<W: Write>(config: &Config, plan: &RunPlan, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "Steps".bold().cyan())?;
    writeln!(out)?;
    writeln!(out, "  {} {}", "Database:".bold(), config.database.path.display())?;
    writeln!(out, "  {} {}", "Table:".bold(), quote_ident(&config.table.name))?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<4} {:<40} {:<6} {}",
        "#".bold(),
        "Step".bold(),
        "Kind".bold(),
        "Description".bold()
    )?;
    writeln!(out, "{}", "-".repeat(100))?;

    for (idx, step) in plan.steps.iter().enumerate() {
        let kind = if step.is_mutation() {
            "write".yellow()
        } else {
            "read".green()
        };
        writeln!(
            out,
            "{:<4} {:<40} {:<6} {}",
            idx + 1,
            step.title(),
            kind,
            step.description()
        )?;
    }

    Ok(())
}
