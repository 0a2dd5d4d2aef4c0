//! Run plan data model.
//!
//! A plan is the ordered list of steps the runner executes. The standard plan
//! carries fixed literals; nothing here is taken from user input.

use super::ranking::{CountFilter, NaturalKey, RankingRecord, ScoreThreshold};
use serde::{Deserialize, Serialize};

/// Rows shown by the preview and the capped aggregate reports.
pub const DEFAULT_ROW_LIMIT: u32 = 10;

/// A single step of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// First `limit` rows, unfiltered.
    Preview { limit: u32 },
    /// Institutions present in more than one distinct year.
    MultiYearInstitutions { limit: u32 },
    /// Average world rank per country for one year.
    AverageRankByCountry { year: i64, limit: u32 },
    /// Average score per year and its change from the previous year.
    YearOverYear,
    /// Insert a record, then read it back by its natural key.
    Insert { record: RankingRecord },
    /// Count rows matching a country/year/rank filter.
    Count { filter: CountFilter },
    /// Add `delta` to the score of rows matching `key`, with before/after reads.
    AdjustScore { key: NaturalKey, delta: f64 },
    /// Delete rows under a score threshold, then recount.
    DeleteBelow { threshold: ScoreThreshold },
}

impl Step {
    /// Section title printed above the step's output.
    pub fn title(&self) -> &'static str {
        match self {
            Step::Preview { .. } => "FIRST RECORDS",
            Step::MultiYearInstitutions { .. } => "UNIVERSITIES IN MULTIPLE YEARS",
            Step::AverageRankByCountry { .. } => "AVERAGE RANK PER COUNTRY",
            Step::YearOverYear => "YEAR-OVER-YEAR CHANGE IN AVERAGE SCORE",
            Step::Insert { .. } => "INSERT OPERATION",
            Step::Count { .. } => "READ OPERATION",
            Step::AdjustScore { .. } => "UPDATE OPERATION",
            Step::DeleteBelow { .. } => "DELETE OPERATION",
        }
    }

    /// One-line description of what the step does with its literals.
    pub fn description(&self) -> String {
        match self {
            Step::Preview { limit } => format!("First {} records", limit),
            Step::MultiYearInstitutions { limit } => {
                format!("Top {} institutions present in more than one year", limit)
            }
            Step::AverageRankByCountry { year, limit } => {
                format!("Top {} countries by average rank in {}", limit, year)
            }
            Step::YearOverYear => "Average score per year and change from the previous year".to_string(),
            Step::Insert { record } => format!("Inserting {}", record),
            Step::Count { filter } => format!(
                "Counting {} institutions in top {} in {}",
                filter.country, filter.max_rank, filter.year
            ),
            Step::AdjustScore { key, delta } => {
                format!("Updating {} score {:+}", key, delta)
            }
            Step::DeleteBelow { threshold } => format!(
                "Deleting {} rows with score < {}",
                threshold.year, threshold.below
            ),
        }
    }

    /// Whether the step writes to the table.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Step::Insert { .. } | Step::AdjustScore { .. } | Step::DeleteBelow { .. }
        )
    }
}

/// Ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub steps: Vec<Step>,
}

impl RunPlan {
    /// The full reporting and mutation sequence.
    pub fn standard() -> Self {
        let mut plan = Self::exploration();
        plan.steps.extend([
            Step::Insert {
                record: RankingRecord::new("Duke Tech", "USA", 350, 60.5, 2014),
            },
            Step::Count {
                filter: CountFilter {
                    country: "Japan".to_string(),
                    year: 2013,
                    max_rank: 200,
                },
            },
            Step::AdjustScore {
                key: NaturalKey::new("University of Oxford", 2014),
                delta: 1.2,
            },
            Step::DeleteBelow {
                threshold: ScoreThreshold {
                    year: 2015,
                    below: 45.0,
                },
            },
        ]);
        plan
    }

    /// Read-only exploration reports.
    pub fn exploration() -> Self {
        Self {
            steps: vec![
                Step::Preview {
                    limit: DEFAULT_ROW_LIMIT,
                },
                Step::MultiYearInstitutions {
                    limit: DEFAULT_ROW_LIMIT,
                },
                Step::AverageRankByCountry {
                    year: 2015,
                    limit: DEFAULT_ROW_LIMIT,
                },
                Step::YearOverYear,
            ],
        }
    }

    /// Whether no step writes to the table.
    pub fn is_read_only(&self) -> bool {
        !self.steps.iter().any(Step::is_mutation)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
