//! JSON schema file format.
//!
//! Lets the CLI and tests declare a collection without Rust code:
//!
//! ```json
//! {
//!   "collection": "users",
//!   "timestamps": true,
//!   "fields": [
//!     { "name": "age", "type": "integer", "indexed": true },
//!     { "name": "profile.city", "type": "text" }
//!   ],
//!   "indexes": [
//!     { "name": "by_age_city", "fields": ["age", "profile.city"] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SchemaError;
use super::builder::{FieldDef, SchemaBuilder};
use super::definition::{SchemaModel, SqlType};

fn default_true() -> bool {
    true
}

/// Top-level schema file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub collection: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_column: Option<String>,

    #[serde(default)]
    pub timestamps: bool,

    #[serde(default = "default_true")]
    pub cacheable: bool,

    #[serde(default)]
    pub fields: Vec<FieldFile>,

    #[serde(default)]
    pub indexes: Vec<IndexFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldFile {
    pub name: String,

    #[serde(rename = "type")]
    pub sql_type: SqlType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub indexed: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default = "default_true")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl SchemaFile {
    /// Read and parse a schema file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| SchemaError::Load {
            path: path.display().to_string(),
            message: format!("invalid JSON: {}", e),
        })
    }

    /// Validate the declarations into a `SchemaModel`.
    pub fn into_model(self) -> Result<SchemaModel, SchemaError> {
        let mut builder = SchemaBuilder::new(self.collection)
            .timestamps(self.timestamps)
            .cacheable(self.cacheable);

        if let Some(column) = self.body_column {
            builder = builder.body_column(column);
        }

        for field in self.fields {
            let mut def = FieldDef::new(field.name, field.sql_type);
            if let Some(path) = field.path {
                def = def.stored_at(path);
            }
            if field.indexed {
                def = def.indexed();
            }
            if field.unique {
                def = def.unique();
            }
            if !field.nullable {
                def = def.not_null();
            }
            if let Some(default) = field.default {
                def = def.with_default(default);
            }
            builder = builder.field(def);
        }

        for index in self.indexes {
            builder = builder.compound_index(index.name, index.fields, index.unique);
        }

        builder.build()
    }
}

/// Load a schema file straight into a `SchemaModel`.
pub fn load_schema(path: &Path) -> Result<SchemaModel, SchemaError> {
    SchemaFile::load(path)?.into_model()
}
