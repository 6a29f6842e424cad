//! Filter and options compilation.
//!
//! # Architecture
//!
//! 1. **Definition** - `FilterNode` and `QueryOptions` describe what to match
//!    and how to order it, either built in Rust or parsed from JSON (`parse`)
//! 2. **Resolution** - `resolver` maps field names to generated columns or
//!    `json_extract` expressions
//! 3. **Compilation** - `compilers` turn the tree into SQL text plus ordered
//!    parameters (`CompiledQuery`)
//! 4. **Caching** - `StructuralCache` reuses SQL for filters of the same shape
//!
//! # Example
//!
//! ```ignore
//! let cache = StructuralCache::default();
//! let filter = parse_filter(&json!({"age": {"$gte": 18, "$lt": 65}}))?;
//! let compiled = cache.translate(&schema, &filter)?;
//! assert_eq!(compiled.sql, "(_idx_age >= ? AND _idx_age < ?)");
//! ```

pub mod cache;
pub mod compiled;
pub mod compilers;
pub mod error;
pub mod filter;
pub mod options;
pub mod params;
pub mod parse;
pub mod resolver;
pub mod shape;

pub use cache::{CacheConfig, CacheEntry, CacheStats, StructuralCache, DEFAULT_CACHE_SIZE};
pub use compiled::CompiledQuery;
pub use compilers::{compile_filter, compile_options, compile_select};
pub use error::{QueryError, QueryResult};
pub use filter::{FieldOperator, FilterNode, LogicalKind, OperatorKind};
pub use options::{QueryOptions, SortDirection, SortKey};
pub use params::ParamSlot;
pub use parse::{parse_filter, parse_filter_str, parse_options, parse_options_str};
pub use resolver::{resolve, ColumnRef, ResolutionRoot};
pub use shape::ShapeKey;
