//! Filter tree definitions.
//!
//! A filter is a recursive tree of logical combinators over field predicates.
//! Children are owned, so no arena is needed; the tree is acyclic by
//! construction.

use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// Logical combinator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalKind {
    And,
    Or,
    Nor,
    /// Carries exactly one operand
    Not,
}

impl LogicalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalKind::And => "$and",
            LogicalKind::Or => "$or",
            LogicalKind::Nor => "$nor",
            LogicalKind::Not => "$not",
        }
    }
}

/// Operator applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOperator {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// Raw LIKE pattern; wildcards are the caller's business
    Like(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Raw LIKE pattern matched case-insensitively
    ILike(String),
    All(Vec<Value>),
    Size(i64),
    ElemMatch(Box<FilterNode>),
    Exists(bool),
}

/// Payload-free operator tag, used for shape keys and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    StartsWith,
    EndsWith,
    Contains,
    ILike,
    All,
    Size,
    ElemMatch,
    Exists,
}

impl OperatorKind {
    /// The operator spelling used in JSON filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "$eq",
            OperatorKind::Ne => "$ne",
            OperatorKind::Gt => "$gt",
            OperatorKind::Gte => "$gte",
            OperatorKind::Lt => "$lt",
            OperatorKind::Lte => "$lte",
            OperatorKind::In => "$in",
            OperatorKind::NotIn => "$nin",
            OperatorKind::Like => "$like",
            OperatorKind::StartsWith => "$startsWith",
            OperatorKind::EndsWith => "$endsWith",
            OperatorKind::Contains => "$contains",
            OperatorKind::ILike => "$ilike",
            OperatorKind::All => "$all",
            OperatorKind::Size => "$size",
            OperatorKind::ElemMatch => "$elemMatch",
            OperatorKind::Exists => "$exists",
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            OperatorKind::Gt | OperatorKind::Gte | OperatorKind::Lt | OperatorKind::Lte
        )
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            OperatorKind::Like
                | OperatorKind::StartsWith
                | OperatorKind::EndsWith
                | OperatorKind::Contains
                | OperatorKind::ILike
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            OperatorKind::All | OperatorKind::Size | OperatorKind::ElemMatch
        )
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldOperator {
    pub fn kind(&self) -> OperatorKind {
        match self {
            FieldOperator::Eq(_) => OperatorKind::Eq,
            FieldOperator::Ne(_) => OperatorKind::Ne,
            FieldOperator::Gt(_) => OperatorKind::Gt,
            FieldOperator::Gte(_) => OperatorKind::Gte,
            FieldOperator::Lt(_) => OperatorKind::Lt,
            FieldOperator::Lte(_) => OperatorKind::Lte,
            FieldOperator::In(_) => OperatorKind::In,
            FieldOperator::NotIn(_) => OperatorKind::NotIn,
            FieldOperator::Like(_) => OperatorKind::Like,
            FieldOperator::StartsWith(_) => OperatorKind::StartsWith,
            FieldOperator::EndsWith(_) => OperatorKind::EndsWith,
            FieldOperator::Contains(_) => OperatorKind::Contains,
            FieldOperator::ILike(_) => OperatorKind::ILike,
            FieldOperator::All(_) => OperatorKind::All,
            FieldOperator::Size(_) => OperatorKind::Size,
            FieldOperator::ElemMatch(_) => OperatorKind::ElemMatch,
            FieldOperator::Exists(_) => OperatorKind::Exists,
        }
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterNode {
    Logical {
        kind: LogicalKind,
        operands: Vec<FilterNode>,
    },
    FieldPredicate {
        path: String,
        op: FieldOperator,
    },
    /// Matches every document
    #[default]
    Empty,
}

impl FilterNode {
    pub fn and(operands: Vec<FilterNode>) -> Self {
        FilterNode::Logical {
            kind: LogicalKind::And,
            operands,
        }
    }

    pub fn or(operands: Vec<FilterNode>) -> Self {
        FilterNode::Logical {
            kind: LogicalKind::Or,
            operands,
        }
    }

    pub fn nor(operands: Vec<FilterNode>) -> Self {
        FilterNode::Logical {
            kind: LogicalKind::Nor,
            operands,
        }
    }

    pub fn not(operand: FilterNode) -> Self {
        FilterNode::Logical {
            kind: LogicalKind::Not,
            operands: vec![operand],
        }
    }

    pub fn field(path: impl Into<String>, op: FieldOperator) -> Self {
        FilterNode::FieldPredicate {
            path: path.into(),
            op,
        }
    }

    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Eq(value.into()))
    }

    pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Ne(value.into()))
    }

    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Gt(value.into()))
    }

    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Gte(value.into()))
    }

    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Lt(value.into()))
    }

    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, FieldOperator::Lte(value.into()))
    }

    pub fn in_list<I, V>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::field(
            path,
            FieldOperator::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn not_in<I, V>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::field(
            path,
            FieldOperator::NotIn(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn all<I, V>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::field(
            path,
            FieldOperator::All(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn size(path: impl Into<String>, len: i64) -> Self {
        Self::field(path, FieldOperator::Size(len))
    }

    pub fn elem_match(path: impl Into<String>, inner: FilterNode) -> Self {
        Self::field(path, FieldOperator::ElemMatch(Box::new(inner)))
    }

    pub fn exists(path: impl Into<String>, present: bool) -> Self {
        Self::field(path, FieldOperator::Exists(present))
    }

    /// Whether an `ElemMatch` appears anywhere in the tree.
    pub fn contains_elem_match(&self) -> bool {
        match self {
            FilterNode::Empty => false,
            FilterNode::Logical { operands, .. } => operands.iter().any(Self::contains_elem_match),
            FilterNode::FieldPredicate { op, .. } => matches!(op, FieldOperator::ElemMatch(_)),
        }
    }
}
