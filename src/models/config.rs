//! Configuration model.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Rankings table layout.
    pub table: TableSchema,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

/// Name and column layout of the rankings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column names.
    pub columns: ColumnNames,
}

/// Column names for the five ranking fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub institution: String,
    pub country: String,
    pub world_rank: String,
    pub score: String,
    pub year: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("university_database.db"),
        }
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::university_rankings()
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            institution: "institution".to_string(),
            country: "country".to_string(),
            world_rank: "world_rank".to_string(),
            score: "score".to_string(),
            year: "year".to_string(),
        }
    }
}

impl TableSchema {
    /// The `university_rankings` layout used by the exploration script.
    pub fn university_rankings() -> Self {
        Self::named("university_rankings")
    }

    /// The leaner `rankings` layout.
    pub fn rankings() -> Self {
        Self::named("rankings")
    }

    /// A table with the given name and the default column names.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: ColumnNames::default(),
        }
    }

    /// Validate the table and column identifiers.
    pub fn validate(&self) -> Result<()> {
        for ident in std::iter::once(&self.name).chain(self.columns.all()) {
            if ident.trim().is_empty() || ident.contains('\0') {
                return Err(crate::Error::InvalidIdentifier(ident.clone()));
            }
        }
        Ok(())
    }
}

impl ColumnNames {
    /// All five column names, in record field order.
    pub fn all(&self) -> [&String; 5] {
        [
            &self.institution,
            &self.country,
            &self.world_rank,
            &self.score,
            &self.year,
        ]
    }
}

impl Config {
    /// Apply command line overrides.
    pub fn with_overrides(mut self, db: Option<&Path>, table: Option<&str>) -> Self {
        if let Some(db) = db {
            self.database.path = db.to_path_buf();
        }
        if let Some(table) = table {
            self.table.name = table.to_string();
        }
        self
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rankings_report")
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, the default location
/// is tried and defaults are used if it is missing or unreadable.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(crate::Error::PathNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))?
        }
        None => {
            let config_path = default_config_path();
            let mut config = Config::default();
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    match toml::from_str(&content) {
                        Ok(parsed) => config = parsed,
                        Err(e) => tracing::warn!(
                            "Ignoring invalid config {}: {}",
                            config_path.display(),
                            e
                        ),
                    }
                }
            }
            config
        }
    };

    config.table.validate()?;
    Ok(config)
}
