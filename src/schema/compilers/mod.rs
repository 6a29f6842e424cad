//! Database schema compilers.
//!
//! Generates backend-specific DDL from a `SchemaModel`.

pub mod sqlite;

pub use sqlite::SqliteCompiler;
