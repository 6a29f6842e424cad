//! docsql library - MongoDB-style filters compiled to SQLite JSON1 SQL
//!
//! Provides the schema model and DDL compiler, the filter/options translator
//! with its structural cache, and the command and output infrastructure used
//! by the `docsql` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod escape;
pub mod output;
pub mod query;
pub mod schema;
pub mod value;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
