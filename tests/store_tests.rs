//! Integration tests for the ranking store.
//!
//! Tests cover:
//! - Opening existing files and schema checks
//! - Report queries (aggregates, year-over-year change)
//! - Committed writes and per-statement affected counts
//! - Releasing the file on close

use rankings_report::core::store::RankingStore;
use rankings_report::models::config::TableSchema;
use rankings_report::models::ranking::{CountFilter, NaturalKey, RankingRecord, ScoreThreshold};
use rankings_report::Error;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ========== TEST FIXTURES ==========

const SEED: &[(&str, &str, i64, f64, i64)] = &[
    ("University of Oxford", "United Kingdom", 1, 90.5, 2013),
    ("University of Oxford", "United Kingdom", 2, 91.0, 2014),
    ("University of Oxford", "United Kingdom", 2, 92.25, 2015),
    ("University of Tokyo", "Japan", 13, 70.0, 2013),
    ("University of Tokyo", "Japan", 14, 71.5, 2014),
    ("Kyoto University", "Japan", 180, 55.0, 2013),
    ("Osaka University", "Japan", 250, 48.5, 2013),
    ("Harvard University", "USA", 3, 95.0, 2015),
    ("Small College", "USA", 900, 42.0, 2015),
    ("Tiny Institute", "Canada", 950, 44.9, 2015),
    ("Mid University", "Canada", 400, 50.0, 2015),
];

/// Create a database file with a seeded rankings table.
fn create_seeded_db(dir: &Path, table: &str) -> PathBuf {
    let path = dir.join("university_database.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE {} (
            institution TEXT NOT NULL,
            country TEXT NOT NULL,
            world_rank INTEGER NOT NULL,
            score REAL NOT NULL,
            year INTEGER NOT NULL
        );",
        table
    ))
    .unwrap();
    for (institution, country, rank, score, year) in SEED {
        conn.execute(
            &format!(
                "INSERT INTO {} (institution, country, world_rank, score, year) VALUES (?1, ?2, ?3, ?4, ?5)",
                table
            ),
            params![institution, country, rank, score, year],
        )
        .unwrap();
    }
    path
}

fn open_seeded() -> (TempDir, RankingStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "university_rankings");
    let store = RankingStore::open(&path, TableSchema::university_rankings()).unwrap();
    (temp_dir, store)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ========== OPEN TESTS ==========

#[test]
fn test_open_missing_file_does_not_create_it() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.db");

    let result = RankingStore::open(&path, TableSchema::default());
    assert!(matches!(result, Err(Error::PathNotFound(_))));
    assert!(!path.exists());
}

#[test]
fn test_open_missing_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "university_rankings");

    let result = RankingStore::open(&path, TableSchema::rankings());
    assert!(matches!(result, Err(Error::TableNotFound(name)) if name == "rankings"));
}

#[test]
fn test_open_missing_column() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lean.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE rankings (institution TEXT, country TEXT, score REAL, year INTEGER);")
        .unwrap();
    drop(conn);

    let result = RankingStore::open(&path, TableSchema::rankings());
    assert!(matches!(
        result,
        Err(Error::MissingColumn { column, .. }) if column == "world_rank"
    ));
}

#[test]
fn test_open_rankings_variant() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "rankings");

    let store = RankingStore::open(&path, TableSchema::rankings()).unwrap();
    assert_eq!(store.preview(100).unwrap().len(), SEED.len());
}

#[test]
fn test_open_table_name_is_case_insensitive() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "university_rankings");

    let store = RankingStore::open(&path, TableSchema::named("University_Rankings")).unwrap();
    assert_eq!(store.preview(100).unwrap().len(), SEED.len());
}

// ========== REPORT TESTS ==========

#[test]
fn test_preview_respects_limit() {
    let (_dir, store) = open_seeded();

    let result = store.preview(10).unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(
        result.columns,
        vec!["institution", "country", "world_rank", "score", "year"]
    );
}

#[test]
fn test_multi_year_institutions() {
    let (_dir, store) = open_seeded();

    let result = store.multi_year_institutions(10).unwrap();
    let names: Vec<_> = result
        .column("institution")
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    let years: Vec<_> = result
        .column("years_present")
        .unwrap()
        .iter()
        .filter_map(|v| v.as_i64())
        .collect();

    assert_eq!(names, vec!["University of Oxford", "University of Tokyo"]);
    assert_eq!(years, vec![3, 2]);
}

#[test]
fn test_average_rank_by_country() {
    let (_dir, store) = open_seeded();

    let result = store.average_rank_by_country(2015, 10).unwrap();
    let countries: Vec<_> = result
        .column("country")
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    let ranks: Vec<_> = result
        .column("avg_rank")
        .unwrap()
        .iter()
        .filter_map(|v| v.as_f64())
        .collect();

    assert_eq!(countries, vec!["United Kingdom", "USA", "Canada"]);
    assert_eq!(ranks, vec![2.0, 451.5, 675.0]);
}

#[test]
fn test_year_over_year_change_is_rounded_difference() {
    let (_dir, store) = open_seeded();

    let mut by_year: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (_, _, _, score, year) in SEED {
        by_year.entry(*year).or_default().push(*score);
    }
    let averages: BTreeMap<i64, f64> = by_year
        .into_iter()
        .map(|(year, scores)| (year, scores.iter().sum::<f64>() / scores.len() as f64))
        .collect();

    let result = store.year_over_year().unwrap();
    assert_eq!(result.len(), averages.len());

    let year_idx = result.column_index("year").unwrap();
    let avg_idx = result.column_index("avg_score").unwrap();
    let change_idx = result.column_index("change_from_last_year").unwrap();

    for row in &result.rows {
        let year = row[year_idx].as_i64().unwrap();
        let avg = row[avg_idx].as_f64().unwrap();
        assert!((avg - round2(averages[&year])).abs() < 1e-9);

        match averages.get(&(year - 1)) {
            Some(prev) => {
                let change = row[change_idx].as_f64().unwrap();
                let expected = round2(averages[&year] - prev);
                assert!(
                    (change - expected).abs() < 1e-9,
                    "year {}: {} != {}",
                    year,
                    change,
                    expected
                );
            }
            None => assert!(row[change_idx].is_null()),
        }
    }
}

#[test]
fn test_year_over_year_gap_year_has_no_change() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("gap.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE university_rankings (
            institution TEXT NOT NULL,
            country TEXT NOT NULL,
            world_rank INTEGER NOT NULL,
            score REAL NOT NULL,
            year INTEGER NOT NULL
        );
        INSERT INTO university_rankings VALUES ('University of Oxford', 'United Kingdom', 1, 90.0, 2011);
        INSERT INTO university_rankings VALUES ('University of Oxford', 'United Kingdom', 1, 95.0, 2013);
        INSERT INTO university_rankings VALUES ('University of Tokyo', 'Japan', 13, 70.0, 2013);",
    )
    .unwrap();
    drop(conn);

    let store = RankingStore::open(&path, TableSchema::university_rankings()).unwrap();
    let result = store.year_over_year().unwrap();
    assert_eq!(result.len(), 2);

    let years: Vec<_> = result
        .column("year")
        .unwrap()
        .iter()
        .filter_map(|v| v.as_i64())
        .collect();
    assert_eq!(years, vec![2011, 2013]);

    let avg_idx = result.column_index("avg_score").unwrap();
    assert_eq!(result.rows[1][avg_idx].as_f64(), Some(82.5));
    assert!(result
        .column("change_from_last_year")
        .unwrap()
        .iter()
        .all(|v| v.is_null()));
}

// ========== WRITE TESTS ==========

#[test]
fn test_insert_then_read_by_key() {
    let (_dir, store) = open_seeded();
    let record = RankingRecord::new("Duke Tech", "USA", 350, 60.5, 2014);

    assert_eq!(store.insert(&record).unwrap(), 1);

    let found = store.records_for(&NaturalKey::new("Duke Tech", 2014)).unwrap();
    assert_eq!(found, vec![record]);
}

#[test]
fn test_insert_twice_duplicates() {
    let (_dir, store) = open_seeded();
    let record = RankingRecord::new("Duke Tech", "USA", 350, 60.5, 2014);

    store.insert(&record).unwrap();
    store.insert(&record).unwrap();

    assert_eq!(store.records_for(&record.key()).unwrap().len(), 2);
}

#[test]
fn test_count_filter_is_inclusive() {
    let (_dir, store) = open_seeded();
    let mut filter = CountFilter {
        country: "Japan".to_string(),
        year: 2013,
        max_rank: 200,
    };

    assert_eq!(store.count(&filter).unwrap(), 2);
    filter.max_rank = 180;
    assert_eq!(store.count(&filter).unwrap(), 2);
    filter.max_rank = 179;
    assert_eq!(store.count(&filter).unwrap(), 1);
}

#[test]
fn test_adjust_score_applies_exact_delta() {
    let (_dir, store) = open_seeded();
    let key = NaturalKey::new("University of Oxford", 2014);

    let before = store.scores_for(&key).unwrap();
    assert_eq!(store.adjust_score(&key, 1.2).unwrap(), 1);
    let after = store.scores_for(&key).unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert!((after[0].score - (before[0].score + 1.2)).abs() < 1e-9);
}

#[test]
fn test_adjust_score_without_match() {
    let (_dir, store) = open_seeded();
    let key = NaturalKey::new("University of Oxford", 1999);

    assert_eq!(store.adjust_score(&key, 1.2).unwrap(), 0);
    assert!(store.scores_for(&key).unwrap().is_empty());
}

#[test]
fn test_delete_count_is_per_statement() {
    let (_dir, store) = open_seeded();
    let threshold = ScoreThreshold {
        year: 2015,
        below: 45.0,
    };

    // Earlier writes must not leak into the delete's count.
    store
        .insert(&RankingRecord::new("Duke Tech", "USA", 350, 60.5, 2014))
        .unwrap();
    store
        .adjust_score(&NaturalKey::new("University of Oxford", 2014), 1.2)
        .unwrap();

    assert_eq!(store.delete_below(&threshold).unwrap(), 2);
    assert_eq!(store.count_below(&threshold).unwrap(), 0);
    assert_eq!(store.count_for_year(2015).unwrap(), 3);
}

#[test]
fn test_writes_are_committed() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "university_rankings");
    let store = RankingStore::open(&path, TableSchema::university_rankings()).unwrap();

    store
        .insert(&RankingRecord::new("Duke Tech", "USA", 350, 60.5, 2014))
        .unwrap();

    // A second connection sees the row while the store is still open.
    let other = Connection::open(&path).unwrap();
    let count: i64 = other
        .query_row(
            "SELECT COUNT(*) FROM university_rankings WHERE institution = 'Duke Tech'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

// ========== CLOSE TESTS ==========

#[test]
fn test_close_releases_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_seeded_db(temp_dir.path(), "university_rankings");

    let store = RankingStore::open(&path, TableSchema::university_rankings()).unwrap();
    store
        .delete_below(&ScoreThreshold {
            year: 2015,
            below: 45.0,
        })
        .unwrap();
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute("DELETE FROM university_rankings WHERE year = 2013", [])
        .unwrap();
    conn.close().unwrap();

    let reopened = RankingStore::open(&path, TableSchema::university_rankings()).unwrap();
    assert_eq!(reopened.count_for_year(2013).unwrap(), 0);
}
