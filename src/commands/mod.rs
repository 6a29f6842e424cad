//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` producing a serializable result
//! - `output.rs` implementing `Outputable` for that result

mod compile;
mod ddl;
mod shape;

pub use compile::CompileCmd;
pub use ddl::DdlCmd;
pub use shape::ShapeCmd;

use clap::Subcommand;
use std::error::Error;

use crate::output::{OutputFormat, Outputable};
use crate::query::StructuralCache;

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, cache: &StructuralCache) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a JSON filter (and options) into SQL with typed parameters
    Compile(CompileCmd),

    /// Show the structural cache key of a filter
    Shape(ShapeCmd),

    /// Print the DDL for a schema file
    Ddl(DdlCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, cache: &StructuralCache, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Compile(cmd) => {
                let result = cmd.execute(cache)?;
                Ok(result.format(format))
            }
            Command::Shape(cmd) => {
                let result = cmd.execute(cache)?;
                Ok(result.format(format))
            }
            Command::Ddl(cmd) => {
                let result = cmd.execute(cache)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().map(String::as_str).unwrap_or_default()).into())
            }
        }
    }
}
