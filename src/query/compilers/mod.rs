//! SQL compilers for filters, options, and full statements.
//!
//! All output targets SQLite's JSON1 functions (`json_extract`, `json_type`,
//! `json_each`, `json_array_length`) with `?` positional placeholders.

pub mod filter;
pub mod options;
pub mod select;

pub use filter::compile_filter;
pub(crate) use filter::compile_filter_template;
pub use options::{compile_options, compile_projection};
pub use select::{assemble_select, compile_select};
