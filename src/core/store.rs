//! SQLite access for the rankings table.
//!
//! The store owns the single connection for a run. Every write runs in its
//! own transaction and is committed before the call returns, so reads issued
//! afterwards on the same store observe it.

use crate::core::queries::Queries;
use crate::models::config::TableSchema;
use crate::models::ranking::{CountFilter, NaturalKey, RankingRecord, ScoreRow, ScoreThreshold};
use crate::models::report::{CellValue, ResultSet};
use crate::utils::fs;
use crate::Result;
use rusqlite::{params, Connection, OpenFlags, Params, Transaction};
use std::path::Path;

/// Owned connection to a database containing the rankings table.
pub struct RankingStore {
    conn: Connection,
    schema: TableSchema,
    queries: Queries,
}

impl RankingStore {
    /// Open an existing database file and check the table layout.
    ///
    /// The file is never created; a missing file is an error.
    pub fn open(path: &Path, schema: TableSchema) -> Result<Self> {
        fs::ensure_file(path)?;
        schema.validate()?;

        tracing::debug!("Opening database: {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn, schema)
    }

    /// Wrap an already open connection and check the table layout.
    pub fn from_connection(conn: Connection, schema: TableSchema) -> Result<Self> {
        schema.validate()?;
        let store = Self {
            queries: Queries::new(&schema),
            conn,
            schema,
        };
        store.check_schema()?;
        Ok(store)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Verify the table exists and has the five configured columns.
    fn check_schema(&self) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE)",
            [&self.schema.name],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(crate::Error::TableNotFound(self.schema.name.clone()));
        }

        let present: Vec<String> = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?
            .query_map([&self.schema.name], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for column in self.schema.columns.all() {
            if !present.iter().any(|p| p.eq_ignore_ascii_case(column)) {
                return Err(crate::Error::MissingColumn {
                    table: self.schema.name.clone(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run a read and materialize every row.
    pub fn select<P: Params>(&self, sql: &str, params: P) -> Result<ResultSet> {
        tracing::debug!("SQL: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map(params, |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(CellValue::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ResultSet { columns, rows })
    }

    /// First `limit` rows of the table.
    pub fn preview(&self, limit: u32) -> Result<ResultSet> {
        self.select(&self.queries.preview(), [limit])
    }

    /// Institutions present in more than one distinct year.
    pub fn multi_year_institutions(&self, limit: u32) -> Result<ResultSet> {
        self.select(&self.queries.multi_year_institutions(), [limit])
    }

    /// Average world rank per country for `year`.
    pub fn average_rank_by_country(&self, year: i64, limit: u32) -> Result<ResultSet> {
        self.select(&self.queries.average_rank_by_country(), params![year, limit])
    }

    /// Average score per year and the rounded change from the previous year.
    pub fn year_over_year(&self) -> Result<ResultSet> {
        self.select(&self.queries.year_over_year(), params![])
    }

    /// All records with the given natural key.
    pub fn records_for(&self, key: &NaturalKey) -> Result<Vec<RankingRecord>> {
        let sql = self.queries.records_by_key();
        tracing::debug!("SQL: {}", sql);
        let records = self
            .conn
            .prepare(&sql)?
            .query_map(params![key.institution, key.year], |row| {
                Ok(RankingRecord {
                    institution: row.get(0)?,
                    country: row.get(1)?,
                    world_rank: row.get(2)?,
                    score: row.get(3)?,
                    year: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Institution, year and score for the given natural key.
    pub fn scores_for(&self, key: &NaturalKey) -> Result<Vec<ScoreRow>> {
        let sql = self.queries.scores_by_key();
        tracing::debug!("SQL: {}", sql);
        let rows = self
            .conn
            .prepare(&sql)?
            .query_map(params![key.institution, key.year], |row| {
                Ok(ScoreRow {
                    institution: row.get(0)?,
                    year: row.get(1)?,
                    score: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of rows matching a country/year/rank filter.
    pub fn count(&self, filter: &CountFilter) -> Result<i64> {
        self.count_with(
            &self.queries.count_matching(),
            params![filter.country, filter.year, filter.max_rank],
        )
    }

    /// Number of rows matching the delete predicate.
    pub fn count_below(&self, threshold: &ScoreThreshold) -> Result<i64> {
        self.count_with(
            &self.queries.count_below(),
            params![threshold.year, threshold.below],
        )
    }

    /// Number of rows for `year`.
    pub fn count_for_year(&self, year: i64) -> Result<i64> {
        self.count_with(&self.queries.count_for_year(), [year])
    }

    fn count_with<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        tracing::debug!("SQL: {}", sql);
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }

    /// Insert one record. Returns the affected row count.
    pub fn insert(&self, record: &RankingRecord) -> Result<usize> {
        let sql = self.queries.insert();
        self.write(|tx| {
            tx.execute(
                &sql,
                params![
                    record.institution,
                    record.country,
                    record.world_rank,
                    record.score,
                    record.year
                ],
            )
        })
    }

    /// Add `delta` to the score of rows matching `key`. Returns the affected row count.
    pub fn adjust_score(&self, key: &NaturalKey, delta: f64) -> Result<usize> {
        let sql = self.queries.adjust_score();
        self.write(|tx| tx.execute(&sql, params![delta, key.institution, key.year]))
    }

    /// Delete rows matching the threshold. Returns the affected row count.
    pub fn delete_below(&self, threshold: &ScoreThreshold) -> Result<usize> {
        let sql = self.queries.delete_below();
        self.write(|tx| tx.execute(&sql, params![threshold.year, threshold.below]))
    }

    /// Run a single statement in its own transaction and commit it.
    fn write<F>(&self, f: F) -> Result<usize>
    where
        F: FnOnce(&Transaction<'_>) -> rusqlite::Result<usize>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let affected = f(&tx)?;
        tx.commit()?;
        tracing::debug!("Committed, {} row(s) affected", affected);
        Ok(affected)
    }

    /// Close the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| crate::Error::Database(e))
    }
}
