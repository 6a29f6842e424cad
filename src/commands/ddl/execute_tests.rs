//! Execute tests for ddl command.

#[cfg(test)]
mod tests {
    use super::super::DdlCmd;
    use crate::commands::Execute;
    use crate::query::StructuralCache;
    use crate::test_utils::{create_temp_json_file, users_schema_file};
    use rstest::rstest;

    #[rstest]
    fn test_users_ddl() {
        let schema_file = users_schema_file();
        let result = DdlCmd {
            schema: schema_file.path().to_path_buf(),
        }
        .execute(&StructuralCache::default())
        .unwrap();

        assert_eq!(result.collection, "users");
        // table, four single-field indexes, one compound
        assert_eq!(result.statements.len(), 6);
        assert!(result.statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"users\""));
        assert!(result.statements[0].contains(
            "_idx_age INTEGER GENERATED ALWAYS AS (json_extract(data, '$.age')) VIRTUAL"
        ));
        assert!(!result.statements[0].contains("_idx_tags"));
        assert!(result
            .statements
            .contains(&"CREATE UNIQUE INDEX IF NOT EXISTS \"idx_users_email\" ON \"users\" (_idx_email)".to_string()));
        assert_eq!(
            result.statements[5],
            "CREATE INDEX IF NOT EXISTS \"idx_users_by_status_age\" ON \"users\" (_idx_status, _idx_age)"
        );
    }

    #[rstest]
    fn test_invalid_schema_fails() {
        let schema_file = create_temp_json_file(
            r#"{"collection": "users", "fields": [{"name": "a", "type": "integer"}, {"name": "a", "type": "text"}]}"#,
        );
        let result = DdlCmd {
            schema: schema_file.path().to_path_buf(),
        }
        .execute(&StructuralCache::default());
        assert!(result.unwrap_err().to_string().contains("declared more than once"));
    }

    #[rstest]
    fn test_malformed_schema_file_fails() {
        let schema_file = create_temp_json_file("{not json");
        let result = DdlCmd {
            schema: schema_file.path().to_path_buf(),
        }
        .execute(&StructuralCache::default());
        assert!(result.unwrap_err().to_string().contains("invalid JSON"));
    }
}
