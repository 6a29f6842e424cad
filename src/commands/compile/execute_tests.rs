//! Execute tests for compile command.

#[cfg(test)]
mod tests {
    use super::super::CompileCmd;
    use crate::commands::Execute;
    use crate::query::{CacheConfig, StructuralCache};
    use crate::test_utils::users_schema_file;
    use crate::value::Value;
    use rstest::{fixture, rstest};
    use tempfile::NamedTempFile;

    #[fixture]
    fn schema_file() -> NamedTempFile {
        users_schema_file()
    }

    fn cmd(schema_file: &NamedTempFile, filter: &str, options: Option<&str>, select: bool) -> CompileCmd {
        CompileCmd {
            schema: schema_file.path().to_path_buf(),
            filter: filter.to_string(),
            options: options.map(str::to_string),
            select,
        }
    }

    #[rstest]
    fn test_compile_where_clause(schema_file: NamedTempFile) {
        let cache = StructuralCache::default();
        let result = cmd(&schema_file, r#"{"age": {"$gte": 18, "$lt": 65}}"#, None, false)
            .execute(&cache)
            .unwrap();

        assert_eq!(result.collection, "users");
        assert_eq!(result.fragments.len(), 1);
        let fragment = &result.fragments[0];
        assert_eq!(fragment.clause, "where");
        assert_eq!(fragment.query.sql, "(_idx_age >= ? AND _idx_age < ?)");
        assert_eq!(fragment.query.params, vec![Value::from(18i64), Value::from(65i64)]);
        assert_eq!(fragment.param_types, vec!["integer", "integer"]);
    }

    #[rstest]
    fn test_compile_with_options(schema_file: NamedTempFile) {
        let cache = StructuralCache::default();
        let result = cmd(
            &schema_file,
            r#"{"status": "active"}"#,
            Some(r#"{"sort": {"age": -1, "name": 1}, "limit": 10, "skip": 20}"#),
            false,
        )
        .execute(&cache)
        .unwrap();

        assert_eq!(result.fragments.len(), 2);
        assert_eq!(result.fragments[1].clause, "options");
        assert_eq!(
            result.fragments[1].query.sql,
            "ORDER BY _idx_age DESC, json_extract(data, '$.name') ASC LIMIT ? OFFSET ?"
        );
    }

    #[rstest]
    fn test_compile_select(schema_file: NamedTempFile) {
        let cache = StructuralCache::default();
        let result = cmd(&schema_file, r#"{"tags": {"$size": 3}}"#, Some(r#"{"limit": 5}"#), true)
            .execute(&cache)
            .unwrap();

        assert_eq!(result.fragments.len(), 1);
        assert_eq!(
            result.fragments[0].query.sql,
            "SELECT data FROM \"users\" WHERE json_array_length(data, '$.tags') = ? LIMIT ?"
        );
        assert_eq!(result.fragments[0].query.params, vec![Value::from(3i64), Value::from(5i64)]);
    }

    #[rstest]
    fn test_compile_populates_cache(schema_file: NamedTempFile) {
        let cache = StructuralCache::new(CacheConfig::default());
        cmd(&schema_file, r#"{"age": 1}"#, None, false).execute(&cache).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn test_invalid_filter_fails(schema_file: NamedTempFile) {
        let cache = StructuralCache::default();
        let result = cmd(&schema_file, r#"{"age": {"$regex": "1"}}"#, None, false).execute(&cache);
        assert!(result.unwrap_err().to_string().contains("$regex"));
    }

    #[rstest]
    fn test_unsupported_operator_fails(schema_file: NamedTempFile) {
        let cache = StructuralCache::default();
        let result = cmd(&schema_file, r#"{"age": {"$contains": "1"}}"#, None, false).execute(&cache);
        assert!(result.unwrap_err().to_string().contains("not supported"));
    }

    #[rstest]
    fn test_missing_schema_fails() {
        let cache = StructuralCache::default();
        let cmd = CompileCmd {
            schema: "/nonexistent/schema.json".into(),
            filter: "{}".to_string(),
            options: None,
            select: false,
        };
        assert!(cmd.execute(&cache).is_err());
    }
}
