//! Data models.

pub mod config;
pub mod plan;
pub mod ranking;
pub mod report;
