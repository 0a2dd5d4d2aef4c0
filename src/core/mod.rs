//! Core business logic modules.

pub mod printer;
pub mod queries;
pub mod runner;
pub mod store;
