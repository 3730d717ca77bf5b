//! Pattern dispatch engine.
//!
//! The engine turns a set of `(pattern, value)` entries into a small number of
//! compiled regexes and resolves input text against them.
//!
//! ## How the parts work together
//!
//! ```text
//! register(pattern, value)
//!      │  validate + count groups          (batch.rs: inspect)
//!      v
//! PatternRegistry entries (IndexMap)       (registry.rs)
//!      │  compile (lazy, on first lookup after a mutation)
//!      v
//! [Batch 0] [Batch 1] ... ≤ batch_size patterns each   (batch.rs)
//!      │  lookup(text): try batches in order
//!      v
//! Hit { id, groups } ──▶ value
//! ```
//!
//! One alternation per batch keeps compile and match cost bounded as the
//! pattern count grows into the thousands, while the common case (a single
//! batch) is one regex search.
//!
//! ## Responsibilities by module
//!
//! - `batch.rs`: builds one anchored alternation per chunk and maps the winning
//!   alternative back to its entry through a side table.
//! - `registry.rs`: entry storage, id assignment, the dirty/clean compile
//!   state, lookup and removal.
//! - `metrics.rs`: optional compile timings.
//! - `persist.rs`: serde support and JSON helpers.
//!
//! ## Debugging
//!
//! The engine logs through the `log` facade: `trace` for batch construction
//! and per-lookup hits, `debug` for compile summaries, `warn` when a batch is
//! split because the regex engine rejected it.

#[path = "engine/batch.rs"]
mod batch;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/persist.rs"]
mod persist;
#[path = "engine/registry.rs"]
mod registry;

pub use batch::Hit;
pub use metrics::CompileMetrics;
pub use persist::{export_json, import_json};
pub use registry::PatternRegistry;

use std::fmt;

/// Identifier of a registered pattern, unique within one registry generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(pub(crate) u64);

impl PatternId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
