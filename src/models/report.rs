//! Step results and run reports.

use super::plan::Step;
use super::ranking::{RankingRecord, ScoreRow};
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// A dynamically typed result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(r) => CellValue::Real(r),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a named column.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}

/// What a step observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    /// A report read.
    Table { result: ResultSet },
    /// Insert plus verification read on the natural key.
    Inserted {
        affected: usize,
        verified: Vec<RankingRecord>,
    },
    /// A scalar count.
    Count { count: i64 },
    /// Before/after reads around a score update.
    Updated {
        affected: usize,
        before: Vec<ScoreRow>,
        after: Vec<ScoreRow>,
    },
    /// Delete plus recounts.
    Deleted {
        affected: usize,
        remaining_matching: i64,
        remaining_for_year: i64,
    },
}

/// A step together with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based position in the plan.
    pub seq: usize,
    pub title: String,
    pub description: String,
    pub step: Step,
    pub outcome: StepOutcome,
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Start timestamp (RFC 3339).
    pub started_at: String,
    pub steps: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Add a step's affected row counts to the totals.
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.steps += 1;
        match outcome {
            StepOutcome::Inserted { affected, .. } => self.inserted += affected,
            StepOutcome::Updated { affected, .. } => self.updated += affected,
            StepOutcome::Deleted { affected, .. } => self.deleted += affected,
            StepOutcome::Table { .. } | StepOutcome::Count { .. } => {}
        }
    }
}
