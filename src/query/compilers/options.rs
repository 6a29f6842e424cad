//! Sort, pagination, and projection clauses.

use tracing::trace;

use crate::escape::escape_sql_string;
use crate::query::compiled::CompiledQuery;
use crate::query::error::{QueryError, QueryResult};
use crate::query::options::QueryOptions;
use crate::query::params::{ParamBuilder, ParamSlot};
use crate::query::resolver::resolve;
use crate::schema::SchemaModel;
use crate::value::Value;

/// Compile `ORDER BY` / `LIMIT` / `OFFSET`.
///
/// Absent options produce an empty fragment. When both are present, `LIMIT`
/// precedes `OFFSET` and binds first.
pub fn compile_options(schema: &SchemaModel, options: &QueryOptions) -> QueryResult<CompiledQuery> {
    let mut clauses = Vec::new();
    let mut params = ParamBuilder::new();

    if !options.sort().is_empty() {
        let keys = options
            .sort()
            .iter()
            .map(|key| format!("{} {}", resolve(schema, &key.field).sql(), key.direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        clauses.push(format!("ORDER BY {}", keys));
    }

    if let Some(limit) = options.limit {
        let value = paging_value("limit", limit)?;
        clauses.push(format!("LIMIT {}", params.bind(ParamSlot::Paging, value)));
    }

    if let Some(skip) = options.skip {
        let value = paging_value("skip", skip)?;
        clauses.push(format!("OFFSET {}", params.bind(ParamSlot::Paging, value)));
    }

    let sql = clauses.join(" ");
    trace!(sql = %sql, params = params.len(), "compiled options");
    Ok(CompiledQuery::new(sql, params.into_values()))
}

/// Paging values are bound as signed 64-bit integers.
fn paging_value(name: &str, value: u64) -> QueryResult<Value> {
    i64::try_from(value)
        .map(Value::Integer)
        .map_err(|_| QueryError::InvalidOptions {
            reason: format!("{} {} exceeds the largest bindable integer", name, value),
        })
}

/// Column list for `SELECT`: the body column, or a `json_object` of the
/// projected fields.
pub fn compile_projection(schema: &SchemaModel, options: &QueryOptions) -> String {
    match options.projection.as_deref() {
        Some(fields) if !fields.is_empty() => {
            let pairs = fields
                .iter()
                .map(|field| format!("'{}', {}", escape_sql_string(field), resolve(schema, field).sql()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("json_object({})", pairs)
        }
        _ => schema.body_column().to_string(),
    }
}
