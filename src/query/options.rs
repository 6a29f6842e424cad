//! Sort, pagination, and field-selection options.

use serde::Serialize;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Options applied after filtering.
///
/// `sort` behaves as an ordered map: keys keep insertion order and a repeated
/// field replaces its earlier direction in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    sort: Vec<SortKey>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    /// Fields to return instead of the whole document body
    pub projection: Option<Vec<String>>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sort key, or updates the direction of an existing one.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        match self.sort.iter_mut().find(|k| k.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.sort.push(SortKey { field, direction }),
        }
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    /// True when no clause would be emitted.
    pub fn is_empty(&self) -> bool {
        self.sort.is_empty() && self.limit.is_none() && self.skip.is_none()
    }
}
