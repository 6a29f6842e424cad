//! Structural query cache.
//!
//! Compiled filter templates are keyed by `ShapeKey`, so calls that differ only
//! in literal values share one SQL string. On a hit the literals are re-extracted
//! from the incoming filter and bound against the stored template.
//!
//! Filters containing `$elemMatch` and schemas marked non-cacheable always
//! compile directly. Capacity is bounded; once exceeded, the oldest inserted
//! shape is evicted first.
//!
//! The cache is an explicit instance (no global state). It is `Sync`: lookups
//! take a shared lock, inserts an exclusive one. Two threads missing the same
//! shape at once both compile and both insert; the entries are equivalent.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compiled::CompiledQuery;
use super::compilers::{assemble_select, compile_filter, compile_filter_template};
use super::error::{QueryError, QueryResult};
use super::filter::FilterNode;
use super::options::QueryOptions;
use super::params::{describe_slots, ParamSlot};
use super::shape::{extract_literals, is_cacheable, ShapeKey};
use crate::schema::SchemaModel;

/// Default number of distinct shapes kept.
pub const DEFAULT_CACHE_SIZE: usize = 500;

fn default_enabled() -> bool {
    true
}

fn default_max_size() -> usize {
    DEFAULT_CACHE_SIZE
}

/// Construction-time cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }
}

/// A stored template. Read-only once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub shape: ShapeKey,
    pub sql_template: String,
    pub param_slots: Vec<ParamSlot>,
}

/// Best-effort counters; relaxed ordering is enough since nothing depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ShapeKey, Arc<CacheEntry>>,
    /// Insertion order, oldest first
    order: VecDeque<ShapeKey>,
}

#[derive(Debug)]
pub struct StructuralCache {
    config: CacheConfig,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for StructuralCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl StructuralCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(CacheConfig::disabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.max_size > 0
    }

    pub fn capacity(&self) -> usize {
        self.config.max_size
    }

    /// Compile a filter, replaying a cached template when the shape is known.
    pub fn translate(&self, schema: &SchemaModel, filter: &FilterNode) -> QueryResult<CompiledQuery> {
        if !self.is_enabled() {
            return compile_filter(schema, filter);
        }
        if !schema.cacheable() {
            debug!(collection = schema.collection(), "schema is not cacheable, compiling directly");
            return compile_filter(schema, filter);
        }
        if !is_cacheable(filter) {
            debug!("filter contains $elemMatch, compiling directly");
            return compile_filter(schema, filter);
        }

        let shape = ShapeKey::of(schema, filter);
        if let Some(entry) = self.get(shape) {
            let (params, slots) = extract_literals(filter)?;
            if slots != entry.param_slots {
                return Err(QueryError::CacheConsistency {
                    shape: shape.value(),
                    expected: describe_slots(&entry.param_slots),
                    found: describe_slots(&slots),
                });
            }
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(shape = %shape, "structural cache hit");
            return Ok(CompiledQuery::new(entry.sql_template.clone(), params));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(shape = %shape, "structural cache miss");

        let (compiled, slots) = compile_filter_template(schema, filter)?;
        self.insert(CacheEntry {
            shape,
            sql_template: compiled.sql.clone(),
            param_slots: slots,
        });
        Ok(compiled)
    }

    /// Compile `SELECT <projection> FROM <table> WHERE <filter> <options>`.
    ///
    /// Only the filter goes through the cache; options are cheap to rebuild.
    pub fn select(
        &self,
        schema: &SchemaModel,
        table: &str,
        filter: &FilterNode,
        options: &QueryOptions,
    ) -> QueryResult<CompiledQuery> {
        let where_clause = self.translate(schema, filter)?;
        assemble_select(schema, table, where_clause, options)
    }

    pub fn get(&self, shape: ShapeKey) -> Option<Arc<CacheEntry>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.get(&shape).cloned()
    }

    pub fn contains(&self, shape: ShapeKey) -> bool {
        self.get(shape).is_some()
    }

    /// Store an entry, evicting the oldest shapes beyond capacity.
    ///
    /// Replacing an existing shape keeps its queue position.
    fn insert(&self, entry: CacheEntry) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let shape = entry.shape;
        if state.entries.insert(shape, Arc::new(entry)).is_none() {
            state.order.push_back(shape);
        }
        while state.entries.len() > self.config.max_size {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(shape = %oldest, capacity = self.config.max_size, "evicted oldest shape");
        }
        debug!(shape = %shape, size = state.entries.len(), capacity = self.config.max_size, "cached shape");
    }

    /// Drop every entry. Always safe, including on a disabled cache.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.order.clear();
        debug!("structural cache cleared");
    }

    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.config.max_size,
        }
    }
}
