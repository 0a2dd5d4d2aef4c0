//! Rankings Report Library
//!
//! Exploratory reporting and verified edits against a university rankings
//! table stored in a local SQLite database.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{Error, Result};
