//! Compile metrics.
//!
//! Compiling is the expensive half of a registry's life: it grows with the
//! number and shape of patterns, while a lookup touches at most one match per
//! batch. These numbers make it easy to see what a `batch_size` change does.
//!
//! Metrics are opt-in: [`PatternRegistry::compile`](crate::PatternRegistry::compile)
//! discards them, [`PatternRegistry::compile_with_metrics`](crate::PatternRegistry::compile_with_metrics)
//! returns them.

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileMetrics {
    /// Elapsed time spent building batches (zero when `cached`).
    pub duration: Duration,
    /// Number of patterns in the registry.
    pub patterns: usize,
    /// Number of compiled batches.
    pub batches: usize,
    /// Batches produced by splitting a combined batch the engine rejected.
    pub fallback_batches: usize,
    /// The registry was already compiled; nothing was rebuilt.
    pub cached: bool,
}
