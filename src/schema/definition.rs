//! Core schema definition types.
//!
//! A `SchemaModel` describes one document collection: which fields exist, where
//! they live inside the document body, which of them are materialized as
//! generated columns, and which compound indexes sit on top of those columns.
//! Models are immutable once built (see `SchemaBuilder`) and shared read-only
//! between compiler calls.

use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Storage type of a materialized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
    Numeric,
    Boolean,
}

impl SqlType {
    /// Lowercase name as written in schema files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Text => "text",
            SqlType::Integer => "integer",
            SqlType::Real => "real",
            SqlType::Blob => "blob",
            SqlType::Numeric => "numeric",
            SqlType::Boolean => "boolean",
        }
    }

    /// Returns the SQLite column type name for this type.
    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
            SqlType::Numeric => "NUMERIC",
            // SQLite has no boolean storage class
            SqlType::Boolean => "INTEGER",
        }
    }

    /// Whether values of this type have a meaningful ordering for `<`/`>`.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, SqlType::Boolean | SqlType::Blob)
    }

    /// Whether string pattern and array operators can apply.
    ///
    /// Arrays are stored as JSON text, so both families require `Text`.
    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Text)
    }
}

/// A named field of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Field name as used in filters, possibly dotted (e.g. "profile.city")
    pub name: String,

    /// JSON path inside the document body (e.g. "$.profile.city")
    pub storage_path: String,

    pub sql_type: SqlType,

    /// Materialized as a generated column and addressable directly
    pub indexed: bool,

    pub unique: bool,

    pub nullable: bool,

    /// Default value (if any). None means no default.
    pub default: Option<Value>,
}

impl SchemaField {
    /// Deterministic generated-column identifier for this field.
    pub fn column_name(&self) -> String {
        generated_column_name(&self.name)
    }
}

/// Column identifier for a materialized field: `_idx_` followed by the field
/// name with every non-identifier character replaced by `_`.
///
/// Shared by the resolver and the DDL compiler, so both always agree. The
/// mapping is lossy; `SchemaBuilder::build` rejects fields that collide.
pub fn generated_column_name(field_name: &str) -> String {
    format!("_idx_{}", sanitize_identifier(field_name))
}

/// Index identifier: `idx_<collection>_<name>`, sanitized like column names.
pub fn index_name(collection: &str, name: &str) -> String {
    format!("idx_{}_{}", collection, sanitize_identifier(name))
}

fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// An ordered multi-field index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundIndex {
    pub name: String,

    /// Left-to-right key order; never empty
    pub fields: Vec<String>,

    pub unique: bool,
}

/// Static description of a document collection.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    pub(crate) collection: String,
    pub(crate) body_column: String,
    pub(crate) fields: BTreeMap<String, SchemaField>,
    pub(crate) compound_indexes: Vec<CompoundIndex>,
    pub(crate) timestamps_enabled: bool,
    pub(crate) cacheable: bool,
    pub(crate) fingerprint: u64,
}

impl SchemaModel {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Column holding the JSON document body.
    pub fn body_column(&self) -> &str {
        &self.body_column
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Returns all fields ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.values()
    }

    /// Returns the fields materialized as generated columns.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.values().filter(|f| f.indexed)
    }

    pub fn compound_indexes(&self) -> &[CompoundIndex] {
        &self.compound_indexes
    }

    pub fn timestamps_enabled(&self) -> bool {
        self.timestamps_enabled
    }

    /// Whether compiled filters for this collection may be cached.
    pub fn cacheable(&self) -> bool {
        self.cacheable
    }

    /// Hash over everything that influences generated SQL.
    ///
    /// Mixed into structural cache keys so a single cache can serve several
    /// schemas without cross-talk.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn compute_fingerprint(
        collection: &str,
        body_column: &str,
        fields: &BTreeMap<String, SchemaField>,
    ) -> u64 {
        let mut hasher = DefaultHasher::new();
        collection.hash(&mut hasher);
        body_column.hash(&mut hasher);
        for field in fields.values() {
            field.name.hash(&mut hasher);
            field.storage_path.hash(&mut hasher);
            field.sql_type.hash(&mut hasher);
            field.indexed.hash(&mut hasher);
        }
        hasher.finish()
    }
}
