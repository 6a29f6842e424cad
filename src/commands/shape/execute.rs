use std::error::Error;

use serde::Serialize;

use super::ShapeCmd;
use crate::commands::Execute;
use crate::query::compilers::compile_filter_template;
use crate::query::shape::is_cacheable;
use crate::query::{parse_filter_str, ParamSlot, ShapeKey, StructuralCache};
use crate::schema::load_schema;

/// Result of the shape command execution
#[derive(Debug, Serialize)]
pub struct ShapeResult {
    pub collection: String,
    /// Shape key as 16 hex digits
    pub shape: String,
    pub cacheable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether the shape is currently held by the cache
    pub cached: bool,
    pub param_count: usize,
    pub slots: Vec<ParamSlot>,
}

impl Execute for ShapeCmd {
    type Output = ShapeResult;

    fn execute(self, cache: &StructuralCache) -> Result<Self::Output, Box<dyn Error>> {
        let schema = load_schema(&self.schema)?;
        let filter = parse_filter_str(&self.filter)?;

        // Compiling validates operators and yields the slot layout
        let (_, slots) = compile_filter_template(&schema, &filter)?;
        let shape = ShapeKey::of(&schema, &filter);

        let reason = if !schema.cacheable() {
            Some("schema is marked non-cacheable".to_string())
        } else if !is_cacheable(&filter) {
            Some("filter contains $elemMatch".to_string())
        } else if !cache.is_enabled() {
            Some("cache is disabled".to_string())
        } else {
            None
        };

        Ok(ShapeResult {
            collection: schema.collection().to_string(),
            shape: shape.to_string(),
            cacheable: reason.is_none(),
            reason,
            cached: cache.contains(shape),
            param_count: slots.len(),
            slots,
        })
    }
}
