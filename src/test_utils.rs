//! Shared test utilities for execute and integration tests.
//!
//! This module provides common schemas and file helpers used across command
//! execute tests and compiler tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::schema::{FieldDef, SchemaBuilder, SchemaModel, SqlType};

/// Schema file used by command tests.
pub const USERS_SCHEMA_JSON: &str = r#"
{
    "collection": "users",
    "fields": [
        { "name": "age", "type": "integer", "indexed": true },
        { "name": "status", "type": "text", "indexed": true },
        { "name": "active", "type": "boolean", "indexed": true },
        { "name": "email", "type": "text", "indexed": true, "unique": true },
        { "name": "tags", "type": "text" }
    ],
    "indexes": [
        { "name": "by_status_age", "fields": ["status", "age"] }
    ]
}
"#;

/// Create a temporary file containing the given content.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Write `USERS_SCHEMA_JSON` to a temporary file.
pub fn users_schema_file() -> NamedTempFile {
    create_temp_json_file(USERS_SCHEMA_JSON)
}

/// The same collection as `USERS_SCHEMA_JSON`, built in code.
pub fn users_schema() -> SchemaModel {
    SchemaBuilder::new("users")
        .field(FieldDef::new("age", SqlType::Integer).indexed())
        .field(FieldDef::new("status", SqlType::Text).indexed())
        .field(FieldDef::new("active", SqlType::Boolean).indexed())
        .field(FieldDef::new("email", SqlType::Text).indexed().unique())
        .field(FieldDef::new("tags", SqlType::Text))
        .compound_index("by_status_age", ["status", "age"], false)
        .build()
        .expect("users schema should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_schema;

    #[test]
    fn test_file_and_builder_schemas_agree() {
        let file = users_schema_file();
        let loaded = load_schema(file.path()).unwrap();
        assert_eq!(loaded.fingerprint(), users_schema().fingerprint());
    }
}
