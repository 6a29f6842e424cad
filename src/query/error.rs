//! Query compilation errors.
//!
//! Every variant is fatal: the compiler either returns a complete
//! `CompiledQuery` or one of these. Nothing here is retried.

use thiserror::Error;

use super::filter::OperatorKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The filter tree itself is malformed (e.g. `$not` without exactly one operand).
    #[error("Malformed filter: {reason}")]
    MalformedFilter { reason: String },

    /// The operator cannot be expressed for this field's declared type.
    #[error("Operator {op} is not supported on field '{field}': {reason}")]
    UnsupportedOperator {
        field: String,
        op: OperatorKind,
        reason: String,
    },

    /// A cached template does not fit the filter it was looked up for.
    #[error("Cache consistency violation for shape {shape:016x}: template has {expected} parameter slots, filter supplied {found}")]
    CacheConsistency {
        shape: u64,
        expected: String,
        found: String,
    },

    #[error("Invalid query options: {reason}")]
    InvalidOptions { reason: String },

    /// A JSON filter or options document could not be parsed.
    #[error("Invalid filter JSON: {reason}")]
    InvalidFilterJson { reason: String },
}

impl QueryError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        QueryError::MalformedFilter {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(field: &str, op: OperatorKind, reason: impl Into<String>) -> Self {
        QueryError::UnsupportedOperator {
            field: field.to_string(),
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_json(reason: impl Into<String>) -> Self {
        QueryError::InvalidFilterJson {
            reason: reason.into(),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = QueryError::unsupported("age", OperatorKind::Like, "field is integer");
        let display = err.to_string();
        assert!(display.contains("$like"));
        assert!(display.contains("'age'"));
        assert!(display.contains("field is integer"));
    }

    #[test]
    fn test_cache_consistency_display() {
        let err = QueryError::CacheConsistency {
            shape: 0xabc,
            expected: "2".to_string(),
            found: "3".to_string(),
        };
        assert!(err.to_string().contains("0000000000000abc"));
    }
}
