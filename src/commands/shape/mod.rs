mod cli_tests;
mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Show the structural cache key of a filter and how its parameters bind
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  docsql shape -s users.json -f '{\"age\": {\"$gt\": 18}}'
  docsql shape -s users.json -f '{\"tags\": {\"$elemMatch\": {\"$eq\": \"x\"}}}'

Filters that differ only in literal values report the same shape.")]
pub struct ShapeCmd {
    /// Schema file describing the collection
    #[arg(short, long)]
    pub schema: PathBuf,

    /// MongoDB-style filter document
    #[arg(short, long, default_value = "{}")]
    pub filter: String,
}
