//! SQL text for every step.
//!
//! Table and column names come from configuration, so they are always quoted
//! with [`quote_ident`]. Values are always bound as parameters.

use crate::models::config::TableSchema;

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Statement builder bound to one table layout.
#[derive(Debug, Clone)]
pub struct Queries {
    table: String,
    institution: String,
    country: String,
    world_rank: String,
    score: String,
    year: String,
}

impl Queries {
    pub fn new(schema: &TableSchema) -> Self {
        let c = &schema.columns;
        Self {
            table: quote_ident(&schema.name),
            institution: quote_ident(&c.institution),
            country: quote_ident(&c.country),
            world_rank: quote_ident(&c.world_rank),
            score: quote_ident(&c.score),
            year: quote_ident(&c.year),
        }
    }

    /// `?1` = limit.
    pub fn preview(&self) -> String {
        format!("SELECT * FROM {} LIMIT ?1", self.table)
    }

    /// `?1` = limit.
    pub fn multi_year_institutions(&self) -> String {
        format!(
            "SELECT {inst} AS institution, COUNT(DISTINCT {year}) AS years_present \
             FROM {table} \
             GROUP BY {inst} \
             HAVING COUNT(DISTINCT {year}) > 1 \
             ORDER BY years_present DESC, {inst} \
             LIMIT ?1",
            inst = self.institution,
            year = self.year,
            table = self.table,
        )
    }

    /// `?1` = year, `?2` = limit.
    pub fn average_rank_by_country(&self) -> String {
        format!(
            "SELECT {country} AS country, ROUND(AVG({rank}), 2) AS avg_rank \
             FROM {table} \
             WHERE {year} = ?1 \
             GROUP BY {country} \
             ORDER BY avg_rank ASC \
             LIMIT ?2",
            country = self.country,
            rank = self.world_rank,
            year = self.year,
            table = self.table,
        )
    }

    /// Self-join of per-year averages on adjacent years.
    pub fn year_over_year(&self) -> String {
        format!(
            "WITH yearly_avg AS ( \
                 SELECT {year} AS year, AVG({score}) AS avg_score \
                 FROM {table} \
                 GROUP BY {year} \
             ) \
             SELECT a.year, \
                    ROUND(a.avg_score, 2) AS avg_score, \
                    ROUND(a.avg_score - b.avg_score, 2) AS change_from_last_year \
             FROM yearly_avg a \
             LEFT JOIN yearly_avg b ON a.year = b.year + 1 \
             ORDER BY a.year",
            year = self.year,
            score = self.score,
            table = self.table,
        )
    }

    /// `?1..?5` = institution, country, world_rank, score, year.
    pub fn insert(&self) -> String {
        format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
            self.table, self.institution, self.country, self.world_rank, self.score, self.year
        )
    }

    /// `?1` = institution, `?2` = year.
    pub fn records_by_key(&self) -> String {
        format!(
            "SELECT {}, {}, {}, {}, {} FROM {} WHERE {} = ?1 AND {} = ?2",
            self.institution,
            self.country,
            self.world_rank,
            self.score,
            self.year,
            self.table,
            self.institution,
            self.year
        )
    }

    /// `?1` = country, `?2` = year, `?3` = max rank (inclusive).
    pub fn count_matching(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1 AND {} = ?2 AND {} <= ?3",
            self.table, self.country, self.year, self.world_rank
        )
    }

    /// `?1` = institution, `?2` = year.
    pub fn scores_by_key(&self) -> String {
        format!(
            "SELECT {}, {}, {} FROM {} WHERE {} = ?1 AND {} = ?2",
            self.institution, self.year, self.score, self.table, self.institution, self.year
        )
    }

    /// `?1` = delta, `?2` = institution, `?3` = year.
    pub fn adjust_score(&self) -> String {
        format!(
            "UPDATE {table} SET {score} = {score} + ?1 WHERE {inst} = ?2 AND {year} = ?3",
            table = self.table,
            score = self.score,
            inst = self.institution,
            year = self.year,
        )
    }

    /// `?1` = year, `?2` = exclusive score threshold.
    pub fn delete_below(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} < ?2",
            self.table, self.year, self.score
        )
    }

    /// Same predicate as [`Queries::delete_below`].
    pub fn count_below(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1 AND {} < ?2",
            self.table, self.year, self.score
        )
    }

    /// `?1` = year.
    pub fn count_for_year(&self) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", self.table, self.year)
    }
}
