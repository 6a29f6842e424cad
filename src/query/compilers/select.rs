//! Full `SELECT` statement assembly.

use crate::escape::quote_identifier;
use crate::query::compiled::CompiledQuery;
use crate::query::error::QueryResult;
use crate::query::filter::FilterNode;
use crate::query::options::QueryOptions;
use crate::schema::SchemaModel;

use super::filter::compile_filter;
use super::options::{compile_options, compile_projection};

/// Compile a complete `SELECT` without going through a cache.
pub fn compile_select(
    schema: &SchemaModel,
    table: &str,
    filter: &FilterNode,
    options: &QueryOptions,
) -> QueryResult<CompiledQuery> {
    let where_clause = compile_filter(schema, filter)?;
    assemble_select(schema, table, where_clause, options)
}

/// Combine an already compiled filter with projection and options.
///
/// Parameters are ordered filter first, then options.
pub fn assemble_select(
    schema: &SchemaModel,
    table: &str,
    filter: CompiledQuery,
    options: &QueryOptions,
) -> QueryResult<CompiledQuery> {
    let tail = compile_options(schema, options)?;

    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        compile_projection(schema, options),
        quote_identifier(table),
        filter.sql
    );
    if !tail.is_empty() {
        sql.push(' ');
        sql.push_str(&tail.sql);
    }

    let mut params = filter.params;
    params.extend(tail.params);
    Ok(CompiledQuery::new(sql, params))
}
