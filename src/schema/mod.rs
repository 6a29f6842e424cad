//! Collection schema definitions.
//!
//! The schema system consists of four parts:
//!
//! 1. **Core Types** (`definition.rs`):
//!    - `SqlType` - storage type of a materialized column
//!    - `SchemaField` - a named field with storage path, type, and index flag
//!    - `CompoundIndex` - an ordered multi-field index
//!    - `SchemaModel` - the immutable, validated collection description
//!
//! 2. **Builder** (`builder.rs`): `SchemaBuilder` / `FieldDef`, the only way to
//!    obtain a `SchemaModel`.
//!
//! 3. **Loader** (`loader.rs`): the JSON schema file format.
//!
//! 4. **Compilers** (`compilers/`): DDL for the table, generated columns, and
//!    indexes the query compiler expects to exist.
//!
//! # Type Mapping
//!
//! | SqlType | SQLite column type |
//! |---------|--------------------|
//! | Text | TEXT |
//! | Integer | INTEGER |
//! | Real | REAL |
//! | Blob | BLOB |
//! | Numeric | NUMERIC |
//! | Boolean | INTEGER |

pub mod builder;
pub mod compilers;
mod definition;
pub mod loader;

use thiserror::Error;

pub use builder::{FieldDef, SchemaBuilder};
pub use definition::{generated_column_name, index_name, CompoundIndex, SchemaField, SchemaModel, SqlType};
pub use loader::{load_schema, SchemaFile};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Field '{name}' is declared more than once")]
    DuplicateField { name: String },

    #[error("Invalid field name '{name}': {reason}")]
    InvalidFieldName { name: String, reason: String },

    #[error("Index '{name}' is declared more than once")]
    DuplicateIndex { name: String },

    #[error("Index '{name}' has no fields")]
    EmptyIndex { name: String },

    #[error("Fields '{first}' and '{second}' both map to generated column '{column}'")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },

    #[error("Indexes on '{first}' and '{second}' would both be named '{index}'")]
    IndexNameCollision {
        index: String,
        first: String,
        second: String,
    },

    #[error("Index '{index}' references unknown field '{field}'")]
    UnknownIndexField { index: String, field: String },

    #[error("Failed to load schema from '{path}': {message}")]
    Load { path: String, message: String },
}
