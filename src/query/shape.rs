//! Structural shape keys.
//!
//! A shape key hashes everything about a filter that influences the generated
//! SQL text (variant tags, field paths, operand arities, and the `$exists`
//! flag) and skips the literal payloads that only end up as parameters. Two
//! filters with the same key compile to the same SQL template.
//!
//! `extract_literals` walks the tree in exactly the order the filter compiler
//! binds placeholders, so its output can be replayed against a cached template.

use std::fmt;
use std::hash::{DefaultHasher, Hasher};

use serde::Serialize;

use super::error::{QueryError, QueryResult};
use super::filter::{FieldOperator, FilterNode, LogicalKind, OperatorKind};
use super::params::{ParamBuilder, ParamSlot};
use crate::schema::SchemaModel;
use crate::value::Value;

const TAG_EMPTY: u8 = 0x01;
const TAG_LOGICAL: u8 = 0x02;
const TAG_PREDICATE: u8 = 0x03;

/// Hash of a filter's structure, scoped to one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeKey(pub u64);

impl ShapeKey {
    /// Compute the key for `filter` under `schema`.
    pub fn of(schema: &SchemaModel, filter: &FilterNode) -> Self {
        let mut hasher = DefaultHasher::new();
        hasher.write_u64(schema.fingerprint());
        hash_node(&mut hasher, filter);
        ShapeKey(hasher.finish())
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Whether a filter may be stored in the structural cache.
///
/// `$elemMatch` subtrees are never cached.
pub fn is_cacheable(filter: &FilterNode) -> bool {
    !filter.contains_elem_match()
}

fn hash_node(hasher: &mut DefaultHasher, node: &FilterNode) {
    match node {
        FilterNode::Empty => hasher.write_u8(TAG_EMPTY),
        FilterNode::Logical { kind, operands } => {
            hasher.write_u8(TAG_LOGICAL);
            hasher.write_u8(logical_tag(*kind));
            hasher.write_usize(operands.len());
            for operand in operands {
                hash_node(hasher, operand);
            }
        }
        FilterNode::FieldPredicate { path, op } => {
            hasher.write_u8(TAG_PREDICATE);
            hasher.write_usize(path.len());
            hasher.write(path.as_bytes());
            hasher.write_u8(operator_tag(op.kind()));
            match op {
                FieldOperator::In(values) | FieldOperator::NotIn(values) | FieldOperator::All(values) => {
                    hasher.write_usize(values.len());
                }
                // The flag selects IS NULL vs IS NOT NULL, so it is structure.
                FieldOperator::Exists(present) => hasher.write_u8(u8::from(*present)),
                FieldOperator::ElemMatch(inner) => hash_node(hasher, inner),
                _ => {}
            }
        }
    }
}

fn logical_tag(kind: LogicalKind) -> u8 {
    match kind {
        LogicalKind::And => 0x10,
        LogicalKind::Or => 0x11,
        LogicalKind::Nor => 0x12,
        LogicalKind::Not => 0x13,
    }
}

fn operator_tag(kind: OperatorKind) -> u8 {
    match kind {
        OperatorKind::Eq => 0x20,
        OperatorKind::Ne => 0x21,
        OperatorKind::Gt => 0x22,
        OperatorKind::Gte => 0x23,
        OperatorKind::Lt => 0x24,
        OperatorKind::Lte => 0x25,
        OperatorKind::In => 0x26,
        OperatorKind::NotIn => 0x27,
        OperatorKind::Like => 0x28,
        OperatorKind::StartsWith => 0x29,
        OperatorKind::EndsWith => 0x2a,
        OperatorKind::Contains => 0x2b,
        OperatorKind::ILike => 0x2c,
        OperatorKind::All => 0x2d,
        OperatorKind::Size => 0x2e,
        OperatorKind::ElemMatch => 0x2f,
        OperatorKind::Exists => 0x30,
    }
}

/// Collect the values the compiler would bind for `filter`, in placeholder order.
///
/// Only literal-dependent checks run here; anything that depends on structure
/// alone was already validated when the template was compiled.
pub fn extract_literals(filter: &FilterNode) -> QueryResult<(Vec<Value>, Vec<ParamSlot>)> {
    let mut params = ParamBuilder::new();
    collect(filter, &mut params)?;
    Ok(params.into_parts())
}

fn collect(node: &FilterNode, params: &mut ParamBuilder) -> QueryResult<()> {
    match node {
        FilterNode::Empty => Ok(()),
        FilterNode::Logical { operands, .. } => operands.iter().try_for_each(|op| collect(op, params)),
        FilterNode::FieldPredicate { path, op } => {
            match op {
                FieldOperator::Eq(v)
                | FieldOperator::Ne(v)
                | FieldOperator::Gt(v)
                | FieldOperator::Gte(v)
                | FieldOperator::Lt(v)
                | FieldOperator::Lte(v) => {
                    params.bind(ParamSlot::Literal, v.clone());
                }
                FieldOperator::In(values) | FieldOperator::NotIn(values) | FieldOperator::All(values) => {
                    params.bind_list(values);
                }
                FieldOperator::Like(s) | FieldOperator::ILike(s) => {
                    params.bind(ParamSlot::Literal, Value::Text(s.clone()));
                }
                FieldOperator::StartsWith(s) => {
                    params.bind(ParamSlot::Prefix, ParamSlot::Prefix.pattern(s));
                }
                FieldOperator::EndsWith(s) => {
                    params.bind(ParamSlot::Suffix, ParamSlot::Suffix.pattern(s));
                }
                FieldOperator::Contains(s) => {
                    params.bind(ParamSlot::Infix, ParamSlot::Infix.pattern(s));
                }
                FieldOperator::Size(n) => {
                    if *n < 0 {
                        return Err(QueryError::unsupported(
                            path,
                            OperatorKind::Size,
                            format!("array length cannot be negative ({})", n),
                        ));
                    }
                    params.bind(ParamSlot::Length, Value::Integer(*n));
                }
                FieldOperator::ElemMatch(inner) => collect(inner, params)?,
                FieldOperator::Exists(_) => {}
            }
            Ok(())
        }
    }
}
