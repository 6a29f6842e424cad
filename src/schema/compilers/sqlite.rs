//! SQLite DDL compiler.
//!
//! Generates the document table, one virtual generated column per indexed
//! field, and the indexes over them. Column names come from
//! `generated_column_name`, the same function the query resolver uses, so
//! compiled filters always address columns that exist.

use crate::escape::{escape_sql_string, quote_identifier};
use crate::query::resolver::resolve;
use crate::schema::definition::{index_name, SchemaField, SchemaModel};
use crate::value::Value;

/// Compiler for generating SQLite DDL from schema definitions.
pub struct SqliteCompiler;

impl SqliteCompiler {
    /// Generate the `CREATE TABLE` statement for a collection.
    ///
    /// ```sql
    /// CREATE TABLE IF NOT EXISTS "users" (
    ///     _id INTEGER PRIMARY KEY,
    ///     data TEXT NOT NULL CHECK (json_valid(data)),
    ///     _idx_age INTEGER GENERATED ALWAYS AS (json_extract(data, '$.age')) VIRTUAL
    /// )
    /// ```
    pub fn create_table(schema: &SchemaModel) -> String {
        let body = schema.body_column();
        let mut columns = vec![
            "    _id INTEGER PRIMARY KEY".to_string(),
            format!("    {} TEXT NOT NULL CHECK (json_valid({}))", body, body),
        ];
        columns.extend(Self::generated_columns(schema).into_iter().map(|c| format!("    {}", c)));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_identifier(schema.collection()),
            columns.join(",\n")
        )
    }

    /// Generated column definitions, one per indexed field, ordered by field name.
    pub fn generated_columns(schema: &SchemaModel) -> Vec<String> {
        schema
            .indexed_fields()
            .map(|field| Self::generated_column(schema.body_column(), field))
            .collect()
    }

    fn generated_column(body: &str, field: &SchemaField) -> String {
        let extract = format!("json_extract({}, '{}')", body, escape_sql_string(&field.storage_path));
        let expression = match &field.default {
            Some(default) => format!("COALESCE({}, {})", extract, sql_literal(default)),
            None => extract,
        };
        let not_null = if field.nullable { "" } else { " NOT NULL" };
        format!(
            "{} {} GENERATED ALWAYS AS ({}) VIRTUAL{}",
            field.column_name(),
            field.sql_type.sql_name(),
            expression,
            not_null
        )
    }

    /// Index statements: one per indexed or unique field, then compound indexes.
    ///
    /// Non-indexed fields are indexed by expression, using the same
    /// `json_extract` the query compiler emits, so SQLite can match them.
    pub fn create_indexes(schema: &SchemaModel) -> Vec<String> {
        let table = quote_identifier(schema.collection());

        let single = schema.fields().filter(|f| f.indexed || f.unique).map(|field| {
            Self::index_statement(
                &index_name(schema.collection(), &field.name),
                &table,
                &[resolve(schema, &field.name).sql()],
                field.unique,
            )
        });

        let compound = schema.compound_indexes().iter().map(|index| {
            let keys: Vec<String> = index.fields.iter().map(|f| resolve(schema, f).sql()).collect();
            Self::index_statement(
                &index_name(schema.collection(), &index.name),
                &table,
                &keys,
                index.unique,
            )
        });

        single.chain(compound).collect()
    }

    fn index_statement(name: &str, table: &str, keys: &[String], unique: bool) -> String {
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            quote_identifier(name),
            table,
            keys.join(", ")
        )
    }

    /// Generate every statement needed for a collection, table first.
    pub fn compile_all(schema: &SchemaModel) -> Vec<String> {
        let mut statements = vec![Self::create_table(schema)];
        statements.extend(Self::create_indexes(schema));
        statements
    }
}

/// Render a default value as an inline SQL literal.
fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => format!("'{}'", escape_sql_string(s)),
        Value::Blob(bytes) => format!("X'{}'", hex::encode(bytes)),
        Value::Json(json) => format!("'{}'", escape_sql_string(&json.to_string())),
    }
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
            .field(FieldDef::new("email", SqlType::Text).indexed().unique().not_null())
            .field(FieldDef::new("city", SqlType::Text).stored_at("$.address.city"))
            .compound_index("by_age_city", ["age", "city"], false)
            .build()
            .unwrap()
    }

    #[rstest]
    fn test_create_table(schema: SchemaModel) {
        let expected = "\
CREATE TABLE IF NOT EXISTS \"users\" (
    _id INTEGER PRIMARY KEY,
    data TEXT NOT NULL CHECK (json_valid(data)),
    _idx_age INTEGER GENERATED ALWAYS AS (json_extract(data, '$.age')) VIRTUAL,
    _idx_email TEXT GENERATED ALWAYS AS (json_extract(data, '$.email')) VIRTUAL NOT NULL
)";
        assert_eq!(SqliteCompiler::create_table(&schema), expected);
    }

    #[rstest]
    fn test_generated_column_with_default() {
        let schema = SchemaBuilder::new("users")
            .field(FieldDef::new("role", SqlType::Text).indexed().with_default("o'neil"))
            .build()
            .unwrap();
        assert_eq!(
            SqliteCompiler::generated_columns(&schema),
            vec!["_idx_role TEXT GENERATED ALWAYS AS (COALESCE(json_extract(data, '$.role'), 'o''neil')) VIRTUAL"]
        );
    }

    #[rstest]
    fn test_create_indexes(schema: SchemaModel) {
        let indexes = SqliteCompiler::create_indexes(&schema);
        assert_eq!(
            indexes,
            vec![
                "CREATE INDEX IF NOT EXISTS \"idx_users_age\" ON \"users\" (_idx_age)",
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_users_email\" ON \"users\" (_idx_email)",
                "CREATE INDEX IF NOT EXISTS \"idx_users_by_age_city\" ON \"users\" (_idx_age, json_extract(data, '$.address.city'))",
            ]
        );
    }

    #[rstest]
    fn test_compile_all_starts_with_table(schema: SchemaModel) {
        let statements = SqliteCompiler::compile_all(&schema);
        assert_eq!(statements.len(), 4);
        assert!(statements[0].starts_with("CREATE TABLE"));
    }

    #[rstest]
    fn test_timestamps_get_columns() {
        let schema = SchemaBuilder::new("posts").timestamps(true).build().unwrap();
        let columns = SqliteCompiler::generated_columns(&schema);
        assert_eq!(columns.len(), 2);
        assert!(columns[0].starts_with("_idx_created_at TEXT"));
        assert!(columns[1].starts_with("_idx_updated_at TEXT"));
    }

    #[rstest]
    #[case(Value::Null, "NULL")]
    #[case(Value::Bool(true), "1")]
    #[case(Value::Integer(-4), "-4")]
    #[case(Value::Blob(vec![0xde, 0xad]), "X'dead'")]
    fn test_sql_literal(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(sql_literal(&value), expected);
    }
}
