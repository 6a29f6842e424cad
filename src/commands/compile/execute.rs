use std::error::Error;

use serde::Serialize;

use super::CompileCmd;
use crate::commands::Execute;
use crate::query::{compile_options, parse_filter_str, parse_options_str, CompiledQuery, QueryOptions, StructuralCache};
use crate::schema::load_schema;

/// One compiled piece of SQL with its parameters
#[derive(Debug, Clone, Serialize)]
pub struct CompiledFragment {
    /// "where", "options", or "select"
    pub clause: String,
    #[serde(flatten)]
    pub query: CompiledQuery,
    pub param_types: Vec<String>,
}

impl CompiledFragment {
    pub fn new(clause: &str, query: CompiledQuery) -> Self {
        let param_types = query.params.iter().map(|p| p.type_name().to_string()).collect();
        Self {
            clause: clause.to_string(),
            query,
            param_types,
        }
    }
}

/// Result of the compile command execution
#[derive(Debug, Serialize)]
pub struct CompileResult {
    pub collection: String,
    pub fragments: Vec<CompiledFragment>,
}

impl Execute for CompileCmd {
    type Output = CompileResult;

    fn execute(self, cache: &StructuralCache) -> Result<Self::Output, Box<dyn Error>> {
        let schema = load_schema(&self.schema)?;
        let filter = parse_filter_str(&self.filter)?;
        let options = match &self.options {
            Some(raw) => parse_options_str(raw)?,
            None => QueryOptions::new(),
        };

        let mut fragments = Vec::new();
        if self.select {
            let query = cache.select(&schema, schema.collection(), &filter, &options)?;
            fragments.push(CompiledFragment::new("select", query));
        } else {
            fragments.push(CompiledFragment::new("where", cache.translate(&schema, &filter)?));
            if !options.is_empty() {
                fragments.push(CompiledFragment::new("options", compile_options(&schema, &options)?));
            }
        }

        Ok(CompileResult {
            collection: schema.collection().to_string(),
            fragments,
        })
    }
}
