//! Field resolution.
//!
//! Maps a dotted field name to the SQL expression that reads it. Indexed fields
//! resolve to their generated column; everything else is extracted from the
//! document body with `json_extract`. Unknown fields are not an error: the
//! extraction simply yields NULL at execution time.
//!
//! Inside `$elemMatch` the root changes from the document body to the array
//! element being iterated (`_e<depth>.value`), and generated columns no longer
//! apply.

use crate::escape::{escape_path_key, escape_sql_string};
use crate::schema::SchemaModel;

/// What a field path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionRoot {
    /// The row's document body
    #[default]
    Document,
    /// The current element of an enclosing `json_each`, one per nesting level
    Element { depth: usize },
}

impl ResolutionRoot {
    /// Iteration alias for element roots (`_e1`, `_e2`, ...).
    pub fn alias(&self) -> Option<String> {
        match self {
            ResolutionRoot::Document => None,
            ResolutionRoot::Element { depth } => Some(element_alias(*depth)),
        }
    }

    /// Depth a nested `json_each` must use so it never shadows this one.
    pub fn next_depth(&self) -> usize {
        match self {
            ResolutionRoot::Document => 1,
            ResolutionRoot::Element { depth } => depth + 1,
        }
    }
}

pub(crate) fn element_alias(depth: usize) -> String {
    format!("_e{}", depth)
}

/// A resolved field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Generated column; `body` and `path` are kept for type and array checks
    Column {
        name: String,
        body: String,
        path: String,
    },
    /// `json_extract(source, 'path')`
    Extract { source: String, path: String },
    /// The iterated element itself
    Element { alias: String },
}

impl ColumnRef {
    /// Expression yielding the field's value.
    pub fn sql(&self) -> String {
        match self {
            ColumnRef::Column { name, .. } => name.clone(),
            ColumnRef::Extract { source, path } => {
                format!("json_extract({}, '{}')", source, escape_sql_string(path))
            }
            ColumnRef::Element { alias } => format!("{}.value", alias),
        }
    }

    /// Expression yielding the JSON type name, NULL when the path is absent.
    pub fn type_of(&self) -> String {
        match self {
            ColumnRef::Element { alias } => format!("{}.type", alias),
            _ => self.json_call("json_type"),
        }
    }

    /// Array element count at the path.
    pub fn array_length(&self) -> String {
        self.json_call("json_array_length")
    }

    /// Table-valued iteration over the array at the path.
    pub fn each(&self) -> String {
        self.json_call("json_each")
    }

    pub fn is_column(&self) -> bool {
        matches!(self, ColumnRef::Column { .. })
    }

    fn json_call(&self, function: &str) -> String {
        match self {
            ColumnRef::Column { body, path, .. } => {
                format!("{}({}, '{}')", function, body, escape_sql_string(path))
            }
            ColumnRef::Extract { source, path } => {
                format!("{}({}, '{}')", function, source, escape_sql_string(path))
            }
            ColumnRef::Element { alias } => format!("{}({}.value)", function, alias),
        }
    }
}

/// Resolve a field against the document body.
pub fn resolve(schema: &SchemaModel, field: &str) -> ColumnRef {
    resolve_in(schema, field, ResolutionRoot::Document)
}

/// Resolve a field against the given root.
pub fn resolve_in(schema: &SchemaModel, field: &str, root: ResolutionRoot) -> ColumnRef {
    match root {
        ResolutionRoot::Document => match schema.field(field) {
            Some(declared) if declared.indexed => ColumnRef::Column {
                name: declared.column_name(),
                body: schema.body_column().to_string(),
                path: declared.storage_path.clone(),
            },
            Some(declared) => ColumnRef::Extract {
                source: schema.body_column().to_string(),
                path: declared.storage_path.clone(),
            },
            None => ColumnRef::Extract {
                source: schema.body_column().to_string(),
                path: json_path(field),
            },
        },
        ResolutionRoot::Element { depth } => {
            let alias = element_alias(depth);
            if is_self_path(field) {
                ColumnRef::Element { alias }
            } else {
                ColumnRef::Extract {
                    source: format!("{}.value", alias),
                    path: json_path(field),
                }
            }
        }
    }
}

/// Whether a path names the element itself rather than one of its fields.
pub fn is_self_path(field: &str) -> bool {
    field.is_empty() || field == "$"
}

/// Convert a dotted field name into a JSON path.
///
/// Numeric segments become array indexes (`tags.0` -> `$.tags[0]`) and keys
/// that are not plain identifiers are quoted (`$."first name"`).
pub fn json_path(field: &str) -> String {
    let mut path = String::from("$");
    if is_self_path(field) {
        return path;
    }
    for segment in field.split('.') {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(&escape_path_key(segment));
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, SchemaBuilder, SqlType};
    use rstest::{fixture, rstest};

    #[fixture]
    fn schema() -> SchemaModel {
        SchemaBuilder::new("users")
            .field(FieldDef::new("age", SqlType::Integer).indexed())
            .field(FieldDef::new("city", SqlType::Text).stored_at("$.address.city"))
            .build()
            .unwrap()
    }

    #[rstest]
    #[case("name", "$.name")]
    #[case("a.b.c", "$.a.b.c")]
    #[case("tags.0", "$.tags[0]")]
    #[case("items.2.qty", "$.items[2].qty")]
    #[case("first name", "$.\"first name\"")]
    #[case("", "$")]
    #[case("$", "$")]
    fn test_json_path(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(json_path(field), expected);
    }

    #[rstest]
    fn test_indexed_field_resolves_to_column(schema: SchemaModel) {
        let col = resolve(&schema, "age");
        assert!(col.is_column());
        assert_eq!(col.sql(), "_idx_age");
        assert_eq!(col.type_of(), "json_type(data, '$.age')");
    }

    #[rstest]
    fn test_declared_field_uses_storage_path(schema: SchemaModel) {
        let col = resolve(&schema, "city");
        assert_eq!(col.sql(), "json_extract(data, '$.address.city')");
    }

    #[rstest]
    fn test_unknown_field_extracts_dotted_path(schema: SchemaModel) {
        let col = resolve(&schema, "profile.name");
        assert!(!col.is_column());
        assert_eq!(col.sql(), "json_extract(data, '$.profile.name')");
        assert_eq!(col.array_length(), "json_array_length(data, '$.profile.name')");
        assert_eq!(col.each(), "json_each(data, '$.profile.name')");
    }

    #[rstest]
    #[case("items.0.sku")]
    #[case("first name")]
    #[case("a.b.c")]
    fn test_declaring_a_field_keeps_its_path(schema: SchemaModel, #[case] field: &str) {
        let declared = SchemaBuilder::new("users")
            .field(FieldDef::new(field, SqlType::Text))
            .build()
            .unwrap();
        assert_eq!(resolve(&declared, field).sql(), resolve(&schema, field).sql());
    }

    #[rstest]
    fn test_indexed_array_path_reads_element(schema: SchemaModel) {
        let declared = SchemaBuilder::new("orders")
            .field(FieldDef::new("items.0.sku", SqlType::Text).indexed())
            .build()
            .unwrap();
        let col = resolve(&declared, "items.0.sku");
        assert_eq!(col.sql(), "_idx_items_0_sku");
        assert_eq!(col.type_of(), "json_type(data, '$.items[0].sku')");
        assert_eq!(
            resolve(&schema, "items.0.sku").sql(),
            "json_extract(data, '$.items[0].sku')"
        );
    }

    #[rstest]
    fn test_quote_in_key_is_escaped(schema: SchemaModel) {
        let col = resolve(&schema, "o'brien");
        assert_eq!(col.sql(), "json_extract(data, '$.\"o''brien\"')");
    }

    #[rstest]
    fn test_element_root_ignores_columns(schema: SchemaModel) {
        let col = resolve_in(&schema, "age", ResolutionRoot::Element { depth: 1 });
        assert_eq!(col.sql(), "json_extract(_e1.value, '$.age')");
        assert_eq!(col.type_of(), "json_type(_e1.value, '$.age')");
    }

    #[rstest]
    fn test_element_self(schema: SchemaModel) {
        let col = resolve_in(&schema, "", ResolutionRoot::Element { depth: 2 });
        assert_eq!(col.sql(), "_e2.value");
        assert_eq!(col.type_of(), "_e2.type");
        assert_eq!(col.array_length(), "json_array_length(_e2.value)");
        assert_eq!(col.each(), "json_each(_e2.value)");
    }

    #[rstest]
    fn test_root_depths() {
        assert_eq!(ResolutionRoot::Document.next_depth(), 1);
        assert_eq!(ResolutionRoot::Element { depth: 1 }.next_depth(), 2);
        assert_eq!(ResolutionRoot::Element { depth: 3 }.alias().as_deref(), Some("_e3"));
        assert_eq!(ResolutionRoot::Document.alias(), None);
    }
}
