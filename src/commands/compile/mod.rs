mod execute;
mod execute_tests;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Compile a JSON filter (and options) into SQL with typed parameters
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  docsql compile -s users.json -f '{\"age\": {\"$gte\": 18}}'
  docsql compile -s users.json -f '{\"status\": \"active\"}' --options '{\"sort\": {\"age\": -1}, \"limit\": 10}'
  docsql compile -s users.json -f '{}' --options '{\"fields\": [\"name\"]}' --select")]
pub struct CompileCmd {
    /// Schema file describing the collection
    #[arg(short, long)]
    pub schema: PathBuf,

    /// MongoDB-style filter document
    #[arg(short, long, default_value = "{}")]
    pub filter: String,

    /// Options document: {"sort": {...}, "limit": n, "skip": n, "fields": [...]}
    #[arg(long)]
    pub options: Option<String>,

    /// Emit a complete SELECT against the collection table
    #[arg(long, default_value_t = false)]
    pub select: bool,
}
