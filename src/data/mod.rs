//! Data layer module
//!
//! Handles all access to the geocache store:
//! - SQLite database operations
//! - Store entities and search criteria

mod database;
mod models;

pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
