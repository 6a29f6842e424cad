//! Schema construction and validation.
//!
//! `SchemaBuilder` is the only way to obtain a `SchemaModel`. It validates field
//! names and index declarations once, so the compiler can treat the model as
//! trusted for the lifetime of the collection.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::SchemaError;
use super::definition::{index_name, CompoundIndex, SchemaField, SchemaModel, SqlType};
use crate::query::resolver::json_path;
use crate::value::Value;

/// Column name used for the document body when none is configured.
pub const DEFAULT_BODY_COLUMN: &str = "data";

/// Field names added when timestamps are enabled.
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Declaration of a single field, before validation.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    sql_type: SqlType,
    storage_path: Option<String>,
    indexed: bool,
    unique: bool,
    nullable: bool,
    default: Option<Value>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            storage_path: None,
            indexed: false,
            unique: false,
            nullable: true,
            default: None,
        }
    }

    /// Materialize this field as a generated column.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Override the JSON path inside the document body.
    pub fn stored_at(mut self, path: impl Into<String>) -> Self {
        self.storage_path = Some(path.into());
        self
    }
}

/// Builder for `SchemaModel`.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    collection: String,
    body_column: String,
    fields: Vec<FieldDef>,
    compound_indexes: Vec<CompoundIndex>,
    timestamps: bool,
    cacheable: bool,
}

impl SchemaBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            body_column: DEFAULT_BODY_COLUMN.to_string(),
            fields: Vec::new(),
            compound_indexes: Vec::new(),
            timestamps: false,
            cacheable: true,
        }
    }

    pub fn body_column(mut self, column: impl Into<String>) -> Self {
        self.body_column = column.into();
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn compound_index<I, S>(mut self, name: impl Into<String>, fields: I, unique: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compound_indexes.push(CompoundIndex {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique,
        });
        self
    }

    /// Declare `created_at`/`updated_at` as indexed text fields.
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Validate the declarations and freeze them into a `SchemaModel`.
    pub fn build(self) -> Result<SchemaModel, SchemaError> {
        validate_identifier(&self.body_column)?;

        let mut fields = BTreeMap::new();
        for def in self.fields {
            validate_field_name(&def.name)?;
            if fields.contains_key(&def.name) {
                return Err(SchemaError::DuplicateField { name: def.name });
            }
            let storage_path = def
                .storage_path
                .unwrap_or_else(|| json_path(&def.name));
            fields.insert(
                def.name.clone(),
                SchemaField {
                    name: def.name,
                    storage_path,
                    sql_type: def.sql_type,
                    indexed: def.indexed,
                    unique: def.unique,
                    nullable: def.nullable,
                    default: def.default,
                },
            );
        }

        if self.timestamps {
            for name in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
                fields.entry(name.to_string()).or_insert_with(|| SchemaField {
                    name: name.to_string(),
                    storage_path: json_path(name),
                    sql_type: SqlType::Text,
                    indexed: true,
                    unique: false,
                    nullable: true,
                    default: None,
                });
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.compound_indexes {
            if !index_names.insert(index.name.as_str()) {
                return Err(SchemaError::DuplicateIndex {
                    name: index.name.clone(),
                });
            }
            if index.fields.is_empty() {
                return Err(SchemaError::EmptyIndex {
                    name: index.name.clone(),
                });
            }
            if let Some(missing) = index.fields.iter().find(|f| !fields.contains_key(*f)) {
                return Err(SchemaError::UnknownIndexField {
                    index: index.name.clone(),
                    field: missing.clone(),
                });
            }
        }

        check_name_collisions(&self.collection, &fields, &self.compound_indexes)?;

        let fingerprint = SchemaModel::compute_fingerprint(&self.collection, &self.body_column, &fields);

        Ok(SchemaModel {
            collection: self.collection,
            body_column: self.body_column,
            fields,
            compound_indexes: self.compound_indexes,
            timestamps_enabled: self.timestamps,
            cacheable: self.cacheable,
            fingerprint,
        })
    }
}

/// Sanitized column and index names must stay distinct, or two fields would
/// share one column and `CREATE INDEX IF NOT EXISTS` would skip an index.
fn check_name_collisions(
    collection: &str,
    fields: &BTreeMap<String, SchemaField>,
    compound_indexes: &[CompoundIndex],
) -> Result<(), SchemaError> {
    let mut columns: HashMap<String, &str> = HashMap::new();
    for field in fields.values().filter(|f| f.indexed) {
        let column = field.column_name();
        if let Some(first) = columns.insert(column.clone(), &field.name) {
            return Err(SchemaError::ColumnCollision {
                column,
                first: first.to_string(),
                second: field.name.clone(),
            });
        }
    }

    let mut indexes: HashMap<String, &str> = HashMap::new();
    let sources = fields
        .values()
        .filter(|f| f.indexed || f.unique)
        .map(|f| f.name.as_str())
        .chain(compound_indexes.iter().map(|i| i.name.as_str()));
    for source in sources {
        let index = index_name(collection, source);
        if let Some(first) = indexes.insert(index.clone(), source) {
            return Err(SchemaError::IndexNameCollision {
                index,
                first: first.to_string(),
                second: source.to_string(),
            });
        }
    }
    Ok(())
}

/// Field names are dotted paths of non-empty segments.
fn validate_field_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(SchemaError::InvalidFieldName {
            name: name.to_string(),
            reason: "field names must be non-empty dotted paths".to_string(),
        });
    }
    if name.contains(['\'', '"']) {
        return Err(SchemaError::InvalidFieldName {
            name: name.to_string(),
            reason: "field names cannot contain quotes".to_string(),
        });
    }
    Ok(())
}

fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidFieldName {
            name: name.to_string(),
            reason: "body column must be a plain SQL identifier".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_build_defaults() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new("age", SqlType::Integer).indexed())
            .build()
            .unwrap();

        assert_eq!(schema.collection(), "users");
        assert_eq!(schema.body_column(), "data");
        assert!(schema.cacheable());
        assert!(!schema.timestamps_enabled());

        let age = schema.field("age").unwrap();
        assert_eq!(age.storage_path, "$.age");
        assert!(age.indexed);
        assert!(age.nullable);
    }

    #[rstest]
    fn test_custom_storage_path() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new("city", SqlType::Text).stored_at("$.address.city"))
            .build()
            .unwrap();
        assert_eq!(schema.field("city").unwrap().storage_path, "$.address.city");
    }

    #[rstest]
    fn test_duplicate_field_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("age", SqlType::Integer))
            .field(FieldDef::new("age", SqlType::Real))
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateField { name }) if name == "age"));
    }

    #[rstest]
    #[case("")]
    #[case("a..b")]
    #[case(".a")]
    #[case("a.")]
    #[case("it's")]
    fn test_invalid_field_names_rejected(#[case] name: &str) {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new(name, SqlType::Text))
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidFieldName { .. })));
    }

    #[rstest]
    fn test_invalid_body_column_rejected() {
        let result = SchemaBuilder::new("users").body_column("doc body").build();
        assert!(matches!(result, Err(SchemaError::InvalidFieldName { .. })));
    }

    #[rstest]
    fn test_timestamps_add_indexed_fields() {
        let schema = SchemaBuilder::new("users").timestamps(true).build().unwrap();
        assert!(schema.field(CREATED_AT_FIELD).unwrap().indexed);
        assert!(schema.field(UPDATED_AT_FIELD).unwrap().indexed);
    }

    #[rstest]
    fn test_timestamps_keep_declared_field() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new(CREATED_AT_FIELD, SqlType::Integer))
            .timestamps(true)
            .build()
            .unwrap();
        let created = schema.field(CREATED_AT_FIELD).unwrap();
        assert_eq!(created.sql_type, SqlType::Integer);
        assert!(!created.indexed);
    }

    #[rstest]
    fn test_compound_index_keeps_order() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new("last", SqlType::Text).indexed())
            .field(FieldDef::new("first", SqlType::Text).indexed())
            .compound_index("by_name", ["last", "first"], false)
            .build()
            .unwrap();
        assert_eq!(schema.compound_indexes()[0].fields, vec!["last", "first"]);
    }

    #[rstest]
    fn test_empty_compound_index_rejected() {
        let result = SchemaBuilder::new("users")
            .compound_index("empty", Vec::<String>::new(), false)
            .build();
        assert!(matches!(result, Err(SchemaError::EmptyIndex { .. })));
    }

    #[rstest]
    fn test_compound_index_unknown_field_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("a", SqlType::Text))
            .compound_index("ab", ["a", "b"], false)
            .build();
        assert!(
            matches!(result, Err(SchemaError::UnknownIndexField { field, .. }) if field == "b")
        );
    }

    #[rstest]
    fn test_duplicate_index_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("a", SqlType::Text))
            .compound_index("ix", ["a"], false)
            .compound_index("ix", ["a"], true)
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateIndex { .. })));
    }

    #[rstest]
    fn test_colliding_columns_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("profile.city", SqlType::Text).indexed())
            .field(FieldDef::new("profile_city", SqlType::Text).indexed())
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::ColumnCollision { column, .. }) if column == "_idx_profile_city"
        ));
    }

    #[rstest]
    fn test_colliding_non_indexed_fields_allowed() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new("profile.city", SqlType::Text).indexed())
            .field(FieldDef::new("profile_city", SqlType::Text))
            .build();
        assert!(schema.is_ok());
    }

    #[rstest]
    fn test_colliding_index_names_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("by.age", SqlType::Integer).indexed())
            .field(FieldDef::new("age", SqlType::Integer).indexed())
            .compound_index("by_age", ["age"], false)
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::IndexNameCollision { index, first, second })
                if index == "idx_users_by_age" && first == "by.age" && second == "by_age"
        ));
    }

    #[rstest]
    fn test_unique_field_index_name_collision_rejected() {
        let result = SchemaBuilder::new("users")
            .field(FieldDef::new("a.b", SqlType::Text).unique())
            .field(FieldDef::new("a_b", SqlType::Text).unique())
            .build();
        assert!(matches!(result, Err(SchemaError::IndexNameCollision { .. })));
    }

    #[rstest]
    #[case("items.0.sku", "$.items[0].sku")]
    #[case("first name", "$.\"first name\"")]
    #[case(CREATED_AT_FIELD, "$.created_at")]
    fn test_default_storage_path_matches_json_path(#[case] name: &str, #[case] expected: &str) {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new(name, SqlType::Text))
            .build()
            .unwrap();
        assert_eq!(schema.field(name).unwrap().storage_path, expected);
    }

    #[rstest]
    fn test_non_cacheable_schema() {
        let schema = SchemaBuilder::new("events").cacheable(false).build().unwrap();
        assert!(!schema.cacheable());
    }
}
