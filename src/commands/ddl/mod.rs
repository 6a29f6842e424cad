mod execute;
mod execute_tests;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Print the SQLite DDL (table, generated columns, indexes) for a schema file
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  docsql ddl -s users.json
  docsql ddl -s users.json -o json")]
pub struct DdlCmd {
    /// Schema file describing the collection
    #[arg(short, long)]
    pub schema: PathBuf,
}
