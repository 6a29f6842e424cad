use std::error::Error;

use serde::Serialize;

use super::DdlCmd;
use crate::commands::Execute;
use crate::query::StructuralCache;
use crate::schema::compilers::SqliteCompiler;
use crate::schema::load_schema;

/// Result of the ddl command execution
#[derive(Debug, Serialize)]
pub struct DdlResult {
    pub collection: String,
    pub statements: Vec<String>,
}

impl Execute for DdlCmd {
    type Output = DdlResult;

    fn execute(self, _cache: &StructuralCache) -> Result<Self::Output, Box<dyn Error>> {
        let schema = load_schema(&self.schema)?;
        Ok(DdlResult {
            collection: schema.collection().to_string(),
            statements: SqliteCompiler::compile_all(&schema),
        })
    }
}
