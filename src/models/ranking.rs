//! Ranking-related data models.

use serde::{Deserialize, Serialize};

/// A single row of the rankings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    /// Institution name.
    pub institution: String,
    /// Country the institution is in.
    pub country: String,
    /// World rank (1 is best).
    pub world_rank: i64,
    /// Overall score.
    pub score: f64,
    /// Ranking year.
    pub year: i64,
}

impl RankingRecord {
    pub fn new(
        institution: impl Into<String>,
        country: impl Into<String>,
        world_rank: i64,
        score: f64,
        year: i64,
    ) -> Self {
        Self {
            institution: institution.into(),
            country: country.into(),
            world_rank,
            score,
            year,
        }
    }

    /// The (institution, year) pair identifying this record.
    pub fn key(&self) -> NaturalKey {
        NaturalKey::new(self.institution.clone(), self.year)
    }
}

impl std::fmt::Display for RankingRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, rank {}, score {}, {})",
            self.institution, self.country, self.world_rank, self.score, self.year
        )
    }
}

/// The informal (institution, year) key used for point lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub institution: String,
    pub year: i64,
}

impl NaturalKey {
    pub fn new(institution: impl Into<String>, year: i64) -> Self {
        Self {
            institution: institution.into(),
            year,
        }
    }
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.institution, self.year)
    }
}

/// Matches rows of one country and year at or above a rank cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountFilter {
    pub country: String,
    pub year: i64,
    /// Inclusive: `world_rank <= max_rank`.
    pub max_rank: i64,
}

/// Matches rows of one year scoring strictly below a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreThreshold {
    pub year: i64,
    /// Exclusive: `score < below`.
    pub below: f64,
}

/// Projection used by the update step's before/after reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub institution: String,
    pub year: i64,
    pub score: f64,
}
