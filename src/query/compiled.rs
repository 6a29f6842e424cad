//! Compiled SQL fragments.

use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// SQL text plus the positional parameters for its `?` placeholders.
///
/// `params[i]` binds the i-th placeholder counted left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// An empty fragment with no parameters.
    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Number of `?` placeholders outside quoted literals and identifiers.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Human-readable rendering of the SQL and typed parameters.
    ///
    /// ```text
    /// SQL: _idx_age >= ?
    /// Params (1):
    ///   [1] 18 (integer)
    /// ```
    pub fn explain(&self) -> String {
        let mut lines = vec![format!("SQL: {}", self.sql)];
        if self.params.is_empty() {
            lines.push("Params: (none)".to_string());
        } else {
            lines.push(format!("Params ({}):", self.params.len()));
            for (i, param) in self.params.iter().enumerate() {
                lines.push(format!("  [{}] {} ({})", i + 1, param, param.type_name()));
            }
        }
        lines.join("\n")
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}

/// Count `?` placeholders, skipping `'...'` string literals and `"..."` identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            // A doubled quote closes and immediately reopens, which nets out.
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty() {
        let q = CompiledQuery::empty();
        assert!(q.is_empty());
        assert_eq!(q.param_count(), 0);
    }

    #[rstest]
    #[case("a = ?", 1)]
    #[case("a IN (?, ?, ?)", 3)]
    #[case("json_extract(data, '$.\"what?\"') = ?", 1)]
    #[case("\"odd?col\" = ?", 1)]
    #[case("json_extract(data, '$.o''brien?') = ?", 1)]
    #[case("1=1", 0)]
    fn test_count_placeholders(#[case] sql: &str, #[case] expected: usize) {
        assert_eq!(count_placeholders(sql), expected);
    }

    #[rstest]
    fn test_explain_with_params() {
        let q = CompiledQuery::new("a >= ? AND b = ?", vec![Value::from(18i64), Value::from("x")]);
        let expected = "\
SQL: a >= ? AND b = ?
Params (2):
  [1] 18 (integer)
  [2] \"x\" (text)";
        assert_eq!(q.explain(), expected);
        assert_eq!(q.to_string(), expected);
    }

    #[rstest]
    fn test_explain_without_params() {
        let q = CompiledQuery::new("1=1", vec![]);
        assert_eq!(q.explain(), "SQL: 1=1\nParams: (none)");
    }
}
