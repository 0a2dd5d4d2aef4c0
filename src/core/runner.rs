//! Plan runner.
//!
//! Executes the steps of a plan strictly in order against one store:
//! - reports: read and print
//! - insert: write, commit, read back by natural key
//! - update: read, write, commit, read again with the same key
//! - delete: write, commit, recount with the same predicate
//!
//! The first failing step aborts the run. Nothing is retried or rolled back.

use crate::core::printer::Printer;
use crate::core::store::RankingStore;
use crate::models::plan::{RunPlan, Step};
use crate::models::report::{CellValue, ResultSet, RunSummary, StepOutcome, StepReport};
use crate::Result;
use chrono::Utc;
use std::io::Write;
use std::time::Instant;

/// Runs plans against a borrowed store.
pub struct Runner<'a> {
    store: &'a RankingStore,
}

impl<'a> Runner<'a> {
    pub fn new(store: &'a RankingStore) -> Self {
        Self { store }
    }

    /// Execute every step in order, printing each report as soon as it is available.
    pub fn run<W: Write>(
        &self,
        plan: &RunPlan,
        printer: &mut Printer<W>,
    ) -> Result<(Vec<StepReport>, RunSummary)> {
        let started = Instant::now();
        let mut summary = RunSummary {
            started_at: Utc::now().to_rfc3339(),
            ..Default::default()
        };
        let mut reports = Vec::with_capacity(plan.len());

        tracing::info!(
            "Running {} steps on table {}",
            plan.len(),
            self.store.schema().name
        );

        for (idx, step) in plan.steps.iter().enumerate() {
            let seq = idx + 1;
            tracing::info!("Step [{}/{}]: {}", seq, plan.len(), step.title());

            printer.print_step_header(step)?;
            let outcome = self.execute_step(step, printer).map_err(|e| {
                tracing::error!("Step [{}/{}] failed: {}", seq, plan.len(), e);
                e
            })?;
            summary.record(&outcome);

            let report = StepReport {
                seq,
                title: step.title().to_string(),
                description: step.description(),
                step: step.clone(),
                outcome,
            };
            printer.print_step(&report)?;
            reports.push(report);
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        printer.print_summary(&summary)?;
        Ok((reports, summary))
    }

    /// Execute a single step.
    ///
    /// Reads that precede a write are printed before the write is attempted.
    pub fn execute_step<W: Write>(
        &self,
        step: &Step,
        printer: &mut Printer<W>,
    ) -> Result<StepOutcome> {
        let store = self.store;
        let outcome = match step {
            Step::Preview { limit } => StepOutcome::Table {
                result: store.preview(*limit)?,
            },
            Step::MultiYearInstitutions { limit } => {
                let result = store.multi_year_institutions(*limit)?;
                if let Some(names) = result.column("institution") {
                    tracing::debug!(
                        "{} institution(s) span multiple years",
                        names.iter().filter_map(|v| v.as_str()).count()
                    );
                }
                StepOutcome::Table { result }
            }
            Step::AverageRankByCountry { year, limit } => StepOutcome::Table {
                result: store.average_rank_by_country(*year, *limit)?,
            },
            Step::YearOverYear => {
                let result = store.year_over_year()?;
                log_years_without_previous(&result);
                StepOutcome::Table { result }
            }
            Step::Insert { record } => {
                let affected = store.insert(record)?;
                let verified = store.records_for(&record.key())?;
                tracing::debug!(
                    "Insert verified: {} row(s) for {}",
                    verified.len(),
                    record.key()
                );
                StepOutcome::Inserted { affected, verified }
            }
            Step::Count { filter } => StepOutcome::Count {
                count: store.count(filter)?,
            },
            Step::AdjustScore { key, delta } => {
                let before = store.scores_for(key)?;
                printer.print_before_update(&before)?;
                let affected = store.adjust_score(key, *delta)?;
                let after = store.scores_for(key)?;
                StepOutcome::Updated {
                    affected,
                    before,
                    after,
                }
            }
            Step::DeleteBelow { threshold } => {
                let affected = store.delete_below(threshold)?;
                let remaining_matching = store.count_below(threshold)?;
                let remaining_for_year = store.count_for_year(threshold.year)?;
                if remaining_matching != 0 {
                    tracing::warn!(
                        "{} row(s) still match the delete filter",
                        remaining_matching
                    );
                }
                StepOutcome::Deleted {
                    affected,
                    remaining_matching,
                    remaining_for_year,
                }
            }
        };
        Ok(outcome)
    }
}

/// Log every year whose previous year has no rows.
fn log_years_without_previous(result: &ResultSet) {
    let (Some(year_idx), Some(change_idx)) = (
        result.column_index("year"),
        result.column_index("change_from_last_year"),
    ) else {
        return;
    };
    for row in &result.rows {
        let year = row.get(year_idx).and_then(CellValue::as_i64);
        let missing = row.get(change_idx).is_some_and(CellValue::is_null);
        if let (Some(year), true) = (year, missing) {
            tracing::debug!("No rows for {}, no change reported for {}", year - 1, year);
        }
    }
}
