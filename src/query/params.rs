//! Positional parameter collection.
//!
//! Parameters are appended in exactly the order their `?` placeholders are
//! written. Each parameter also records a `ParamSlot` describing how the bound
//! value was derived from the filter literal, which is what the structural
//! cache checks before replaying a template.

use serde::Serialize;

use crate::value::Value;

/// How a bound value relates to the literal in the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamSlot {
    /// The literal, unchanged
    Literal,
    /// Literal wrapped with LIKE wildcards (`s%`, `%s`, `%s%`)
    Prefix,
    Suffix,
    Infix,
    /// Array length for `$size`
    Length,
    /// LIMIT / OFFSET value
    Paging,
}

impl ParamSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSlot::Literal => "literal",
            ParamSlot::Prefix => "prefix",
            ParamSlot::Suffix => "suffix",
            ParamSlot::Infix => "infix",
            ParamSlot::Length => "length",
            ParamSlot::Paging => "paging",
        }
    }

    /// Builds the bound value for a pattern slot.
    pub(crate) fn pattern(self, s: &str) -> Value {
        match self {
            ParamSlot::Prefix => Value::Text(format!("{}%", s)),
            ParamSlot::Suffix => Value::Text(format!("%{}", s)),
            ParamSlot::Infix => Value::Text(format!("%{}%", s)),
            _ => Value::Text(s.to_string()),
        }
    }
}

/// Render a slot list as `[literal, prefix]` for diagnostics.
pub fn describe_slots(slots: &[ParamSlot]) -> String {
    let names: Vec<_> = slots.iter().map(ParamSlot::as_str).collect();
    format!("{} [{}]", slots.len(), names.join(", "))
}

/// Ordered parameter collector.
#[derive(Debug, Clone, Default)]
pub struct ParamBuilder {
    values: Vec<Value>,
    slots: Vec<ParamSlot>,
}

impl ParamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parameter and return its placeholder.
    pub fn bind(&mut self, slot: ParamSlot, value: Value) -> &'static str {
        self.values.push(value);
        self.slots.push(slot);
        "?"
    }

    /// Bind one placeholder per value and return `?, ?, ...`.
    pub fn bind_list(&mut self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.bind(ParamSlot::Literal, v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn slots(&self) -> &[ParamSlot] {
        &self.slots
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_parts(self) -> (Vec<Value>, Vec<ParamSlot>) {
        (self.values, self.slots)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
