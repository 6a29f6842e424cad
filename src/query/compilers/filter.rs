//! Filter tree to SQL boolean expression.
//!
//! Every rule returns a self-contained fragment: multi-operand `AND`/`OR` are
//! parenthesized, negations wrap their operand, and predicates are bare
//! comparisons. That keeps composition precedence-safe at any depth.
//!
//! Parameters are appended to a single `ParamBuilder` as placeholders are
//! written, so recursive calls always bind before the caller's trailing
//! parameters.
//!
//! | Filter | SQL |
//! |--------|-----|
//! | `Empty`, `And([])`, `Or([])`, `Nor([])` | `1=1` |
//! | `And([a, b])` | `(a AND b)` |
//! | `Nor([a, b])` | `NOT (a OR b)` |
//! | `Not([a])` | `NOT (a)` |
//! | `In([])` | `0=1` |
//! | `NotIn([])`, `All([])` | `1=1` |
//! | `All([x, y])` | `(EXISTS (... = ?) AND EXISTS (... = ?))` |
//! | `Size(n)` | `json_array_length(...) = ?` |
//! | `ElemMatch(f)` | `EXISTS (SELECT 1 FROM json_each(...) AS _eN WHERE f)` |
//! | `Exists(true)` | `json_type(...) IS NOT NULL` |

use tracing::trace;

use crate::query::compiled::CompiledQuery;
use crate::query::error::{QueryError, QueryResult};
use crate::query::filter::{FieldOperator, FilterNode, LogicalKind, OperatorKind};
use crate::query::params::{ParamBuilder, ParamSlot};
use crate::query::resolver::{element_alias, resolve_in, ColumnRef, ResolutionRoot};
use crate::schema::SchemaModel;
use crate::value::Value;

const ALWAYS_TRUE: &str = "1=1";
const ALWAYS_FALSE: &str = "0=1";

/// Compile a filter against the document root.
pub fn compile_filter(schema: &SchemaModel, filter: &FilterNode) -> QueryResult<CompiledQuery> {
    let (query, _) = compile_filter_template(schema, filter)?;
    Ok(query)
}

/// Compile a filter and also return how each parameter was derived.
pub(crate) fn compile_filter_template(
    schema: &SchemaModel,
    filter: &FilterNode,
) -> QueryResult<(CompiledQuery, Vec<ParamSlot>)> {
    let mut compiler = FilterCompiler::new(schema);
    let sql = compiler.node(filter, ResolutionRoot::Document)?;
    let (params, slots) = compiler.params.into_parts();
    trace!(sql = %sql, params = params.len(), "compiled filter");
    Ok((CompiledQuery::new(sql, params), slots))
}

/// Recursive compiler state: the schema and the shared parameter list.
struct FilterCompiler<'a> {
    schema: &'a SchemaModel,
    params: ParamBuilder,
}

impl<'a> FilterCompiler<'a> {
    fn new(schema: &'a SchemaModel) -> Self {
        Self {
            schema,
            params: ParamBuilder::new(),
        }
    }

    fn node(&mut self, node: &FilterNode, root: ResolutionRoot) -> QueryResult<String> {
        match node {
            FilterNode::Empty => Ok(ALWAYS_TRUE.to_string()),
            FilterNode::Logical { kind, operands } => self.logical(*kind, operands, root),
            FilterNode::FieldPredicate { path, op } => self.predicate(path, op, root),
        }
    }

    fn logical(
        &mut self,
        kind: LogicalKind,
        operands: &[FilterNode],
        root: ResolutionRoot,
    ) -> QueryResult<String> {
        match kind {
            LogicalKind::And => self.junction(operands, " AND ", root),
            LogicalKind::Or => self.junction(operands, " OR ", root),
            LogicalKind::Nor => {
                if operands.is_empty() {
                    return Ok(ALWAYS_TRUE.to_string());
                }
                let parts = self.operands(operands, root)?;
                Ok(format!("NOT ({})", parts.join(" OR ")))
            }
            LogicalKind::Not => match operands {
                [operand] => Ok(format!("NOT ({})", self.node(operand, root)?)),
                _ => Err(QueryError::malformed(format!(
                    "$not requires exactly one operand, got {}",
                    operands.len()
                ))),
            },
        }
    }

    fn junction(
        &mut self,
        operands: &[FilterNode],
        separator: &str,
        root: ResolutionRoot,
    ) -> QueryResult<String> {
        let parts = self.operands(operands, root)?;
        Ok(match parts.len() {
            0 => ALWAYS_TRUE.to_string(),
            1 => parts.into_iter().collect(),
            _ => format!("({})", parts.join(separator)),
        })
    }

    fn operands(&mut self, operands: &[FilterNode], root: ResolutionRoot) -> QueryResult<Vec<String>> {
        operands.iter().map(|op| self.node(op, root)).collect()
    }

    fn predicate(&mut self, path: &str, op: &FieldOperator, root: ResolutionRoot) -> QueryResult<String> {
        self.check_supported(path, op, root)?;
        let col = resolve_in(self.schema, path, root);

        let sql = match op {
            FieldOperator::Eq(v) => self.compare(&col, "=", v),
            FieldOperator::Ne(v) => self.compare(&col, "!=", v),
            FieldOperator::Gt(v) => self.compare(&col, ">", v),
            FieldOperator::Gte(v) => self.compare(&col, ">=", v),
            FieldOperator::Lt(v) => self.compare(&col, "<", v),
            FieldOperator::Lte(v) => self.compare(&col, "<=", v),
            FieldOperator::In(values) if values.is_empty() => ALWAYS_FALSE.to_string(),
            FieldOperator::In(values) => {
                format!("{} IN ({})", col.sql(), self.params.bind_list(values))
            }
            FieldOperator::NotIn(values) if values.is_empty() => ALWAYS_TRUE.to_string(),
            FieldOperator::NotIn(values) => {
                format!("{} NOT IN ({})", col.sql(), self.params.bind_list(values))
            }
            FieldOperator::Like(s) => self.pattern(&col, ParamSlot::Literal, s, ""),
            FieldOperator::StartsWith(s) => self.pattern(&col, ParamSlot::Prefix, s, ""),
            FieldOperator::EndsWith(s) => self.pattern(&col, ParamSlot::Suffix, s, ""),
            FieldOperator::Contains(s) => self.pattern(&col, ParamSlot::Infix, s, ""),
            FieldOperator::ILike(s) => self.pattern(&col, ParamSlot::Literal, s, " COLLATE NOCASE"),
            FieldOperator::All(values) => self.all(&col, values, root),
            FieldOperator::Size(n) => {
                let placeholder = self.params.bind(ParamSlot::Length, Value::Integer(*n));
                format!("{} = {}", col.array_length(), placeholder)
            }
            FieldOperator::ElemMatch(inner) => {
                let depth = root.next_depth();
                let alias = element_alias(depth);
                let condition = self.node(inner, ResolutionRoot::Element { depth })?;
                format!(
                    "EXISTS (SELECT 1 FROM {} AS {} WHERE {})",
                    col.each(),
                    alias,
                    condition
                )
            }
            FieldOperator::Exists(true) => format!("{} IS NOT NULL", col.type_of()),
            FieldOperator::Exists(false) => format!("{} IS NULL", col.type_of()),
        };
        Ok(sql)
    }

    fn compare(&mut self, col: &ColumnRef, operator: &str, value: &Value) -> String {
        let placeholder = self.params.bind(ParamSlot::Literal, value.clone());
        format!("{} {} {}", col.sql(), operator, placeholder)
    }

    fn pattern(&mut self, col: &ColumnRef, slot: ParamSlot, s: &str, suffix: &str) -> String {
        let placeholder = self.params.bind(slot, slot.pattern(s));
        format!("{} LIKE {}{}", col.sql(), placeholder, suffix)
    }

    /// One independent membership probe per required value.
    fn all(&mut self, col: &ColumnRef, values: &[Value], root: ResolutionRoot) -> String {
        let alias = element_alias(root.next_depth());
        let probes: Vec<String> = values
            .iter()
            .map(|v| {
                let placeholder = self.params.bind(ParamSlot::Literal, v.clone());
                format!(
                    "EXISTS (SELECT 1 FROM {} AS {} WHERE {}.value = {})",
                    col.each(),
                    alias,
                    alias,
                    placeholder
                )
            })
            .collect();
        match probes.len() {
            0 => ALWAYS_TRUE.to_string(),
            1 => probes.into_iter().collect(),
            _ => format!("({})", probes.join(" AND ")),
        }
    }

    /// Reject operators the declared field type cannot express.
    ///
    /// Undeclared fields and element-relative paths accept everything.
    fn check_supported(&self, path: &str, op: &FieldOperator, root: ResolutionRoot) -> QueryResult<()> {
        let kind = op.kind();
        if let FieldOperator::Size(n) = op
            && *n < 0
        {
            return Err(QueryError::unsupported(
                path,
                kind,
                format!("array length cannot be negative ({})", n),
            ));
        }

        if root != ResolutionRoot::Document {
            return Ok(());
        }
        let Some(field) = self.schema.field(path) else {
            return Ok(());
        };

        let sql_type = field.sql_type;
        if kind.is_pattern() && !sql_type.is_textual() {
            return Err(unsupported_for_type(path, kind, "string patterns need a text field", sql_type.as_str()));
        }
        if kind.is_array() && !sql_type.is_textual() {
            return Err(unsupported_for_type(path, kind, "arrays are stored as JSON text", sql_type.as_str()));
        }
        if kind.is_ordering() && !sql_type.is_ordered() {
            return Err(unsupported_for_type(path, kind, "values have no ordering", sql_type.as_str()));
        }
        Ok(())
    }
}

fn unsupported_for_type(path: &str, kind: OperatorKind, reason: &str, type_name: &str) -> QueryError {
    QueryError::unsupported(path, kind, format!("{}, field is {}", reason, type_name))
}
