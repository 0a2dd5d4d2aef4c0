//! Output rendering for step reports.
//!
//! Text mode prints a labeled section per step followed by an aligned table
//! or scalar lines. JSON mode prints one JSON object per line.

use crate::models::plan::Step;
use crate::models::ranking::{RankingRecord, ScoreRow};
use crate::models::report::{CellValue, ResultSet, RunSummary, StepOutcome, StepReport};
use crate::Result;
use colored::Colorize;
use std::io::Write;
use std::str::FromStr;

/// Rows shown per table in text mode.
pub const DISPLAY_LIMIT: usize = 10;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(crate::Error::other(format!(
                "Unknown output format: {} (expected text or json)",
                other
            ))),
        }
    }
}

/// Writes step reports to an output stream.
pub struct Printer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Consume the printer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the banner shown before the first step.
    pub fn print_banner(&mut self, title: &str) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{}", format!("=== {} ===", title).bold().cyan())?;
        }
        Ok(())
    }

    /// Print a step's section header and description before it runs.
    pub fn print_step_header(&mut self, step: &Step) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out)?;
            writeln!(self.out, "{}", format!("=== {} ===", step.title()).bold().cyan())?;
            writeln!(self.out, "{}", step.description())?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Print the rows read before an update is applied.
    pub fn print_before_update(&mut self, before: &[ScoreRow]) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{}", "Before update:".bold())?;
            write_table(&mut self.out, &scores_table(before))?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Print the outcome of a finished step.
    ///
    /// In text mode the header and before-read are already on the stream.
    pub fn print_step(&mut self, report: &StepReport) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, report)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => self.print_step_text(report)?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Print the final summary.
    pub fn print_summary(&mut self, summary: &RunSummary) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &serde_json::json!({ "summary": summary }))?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                writeln!(self.out)?;
                writeln!(self.out, "{}", "=== DONE ===".bold().green())?;
                writeln!(self.out, "  {} {}", "Steps:".bold(), summary.steps)?;
                writeln!(self.out, "  {} {}", "Inserted:".bold(), summary.inserted)?;
                writeln!(self.out, "  {} {}", "Updated:".bold(), summary.updated)?;
                writeln!(self.out, "  {} {}", "Deleted:".bold(), summary.deleted)?;
                writeln!(self.out, "  {} {} ms", "Elapsed:".bold(), summary.elapsed_ms)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn print_step_text(&mut self, report: &StepReport) -> Result<()> {
        match &report.outcome {
            StepOutcome::Table { result } => {
                write_table(&mut self.out, result)?;
            }
            StepOutcome::Inserted { affected, verified } => {
                writeln!(self.out, "{} {}", "Inserted rows:".bold(), affected)?;
                writeln!(self.out, "{}", "Inserted row:".bold())?;
                write_table(&mut self.out, &records_table(verified))?;
            }
            StepOutcome::Count { count } => {
                writeln!(self.out, "{} {}", "Matching rows:".bold(), count)?;
            }
            StepOutcome::Updated {
                affected, after, ..
            } => {
                writeln!(self.out, "{} {}", "Updated rows:".bold(), affected)?;
                writeln!(self.out, "{}", "After update:".bold())?;
                write_table(&mut self.out, &scores_table(after))?;
            }
            StepOutcome::Deleted {
                affected,
                remaining_matching,
                remaining_for_year,
            } => {
                writeln!(self.out, "{} {}", "Deleted rows:".bold(), affected)?;
                writeln!(
                    self.out,
                    "{} {}",
                    "Remaining rows matching filter:".bold(),
                    remaining_matching
                )?;
                let label = match &report.step {
                    Step::DeleteBelow { threshold } => {
                        format!("Remaining {} rows:", threshold.year)
                    }
                    _ => "Remaining rows for year:".to_string(),
                };
                writeln!(self.out, "{} {}", label.bold(), remaining_for_year)?;
            }
        }
        Ok(())
    }
}

/// Build a displayable table from full records.
pub fn records_table(records: &[RankingRecord]) -> ResultSet {
    ResultSet {
        columns: ["institution", "country", "world_rank", "score", "year"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: records
            .iter()
            .map(|r| {
                vec![
                    CellValue::Text(r.institution.clone()),
                    CellValue::Text(r.country.clone()),
                    CellValue::Integer(r.world_rank),
                    CellValue::Real(r.score),
                    CellValue::Integer(r.year),
                ]
            })
            .collect(),
    }
}

/// Build a displayable table from score projections.
pub fn scores_table(rows: &[ScoreRow]) -> ResultSet {
    ResultSet {
        columns: ["institution", "year", "score"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    CellValue::Text(r.institution.clone()),
                    CellValue::Integer(r.year),
                    CellValue::Real(r.score),
                ]
            })
            .collect(),
    }
}

/// Write an aligned table, numbers right-aligned, capped at [`DISPLAY_LIMIT`] rows.
pub fn write_table<W: Write>(out: &mut W, result: &ResultSet) -> Result<()> {
    if result.is_empty() {
        writeln!(out, "  (no rows)")?;
        return Ok(());
    }

    let shown = &result.rows[..result.len().min(DISPLAY_LIMIT)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<w$}", name, w = *w))
        .collect();
    writeln!(out, "  {}", header.join("  ").bold())?;
    writeln!(
        out,
        "  {}",
        "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))
    )?;

    for (row, values) in cells.iter().zip(shown) {
        let line: Vec<String> = row
            .iter()
            .zip(values)
            .zip(&widths)
            .map(|((text, value), w)| {
                if value.is_null() {
                    format!("{:<w$}", text, w = *w).dimmed().to_string()
                } else if value.as_f64().is_some() {
                    format!("{:>w$}", text, w = *w)
                } else {
                    format!("{:<w$}", text, w = *w)
                }
            })
            .collect();
        writeln!(out, "  {}", line.join("  ").trim_end())?;
    }

    if result.len() > DISPLAY_LIMIT {
        writeln!(out, "  ... and {} more", result.len() - DISPLAY_LIMIT)?;
    }
    Ok(())
}
