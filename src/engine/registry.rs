//! Pattern registry: many regex patterns, one value each.
//!
//! `PatternRegistry` is the dispatch primitive every other layer is built on.
//! It stores entries in registration order and resolves input text to the
//! value of the pattern that matches the *whole* input, case-insensitively by
//! default.
//!
//! ## Lifecycle
//!
//! ```text
//! register ──┐                         ┌── resolve / lookup / remove
//! remove   ──┼─▶ CompileState::Dirty ──┤   (compiles first when Dirty)
//! clear    ──┤                         └─▶ CompileState::Clean(batches)
//! import   ──┘
//! ```
//!
//! Every mutation drops the compiled batches; the next lookup (or an explicit
//! [`PatternRegistry::compile`]) rebuilds them from the current entries, so
//! the batches are always a projection of the entry map.
//!
//! ## Ids
//!
//! Ids are handed out sequentially from 1 and are never reused while the
//! registry lives, even after removal. [`PatternRegistry::clear`] and
//! [`PatternRegistry::import`] start a new generation at 1.

use super::PatternId;
use super::batch::{Batch, Hit, Member, Shape, compile_batches, inspect};
use super::metrics::CompileMetrics;
use crate::api::{Groups, Options};
use crate::error::{DispatchError, Result};
use crate::patterns::PatternSet;
use indexmap::IndexMap;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone)]
struct Entry<T> {
    pattern: String,
    value: T,
    shape: Shape,
}

#[derive(Debug, Clone)]
enum CompileState {
    Dirty,
    Clean(Vec<Batch>),
}

/// Maps regex patterns to values and resolves text to the matching value.
///
/// ```
/// use colloquy::PatternRegistry;
///
/// let mut reg = PatternRegistry::new();
/// reg.register("hello( world(!)*)?", 1).unwrap();
/// reg.register(["regex", "dict key"], 2).unwrap();
///
/// assert_eq!(*reg.lookup("hello world!!!!").unwrap().0, 1);
/// assert_eq!(*reg.lookup("Dict Key").unwrap().0, 2);
/// assert!(reg.lookup("hello there").unwrap_err().is_no_match());
/// ```
#[derive(Clone)]
pub struct PatternRegistry<T> {
    entries: IndexMap<PatternId, Entry<T>>,
    next_id: u64,
    state: CompileState,
    options: Options,
}

impl<T> Default for PatternRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PatternRegistry<T> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        PatternRegistry { entries: IndexMap::new(), next_id: 1, state: CompileState::Dirty, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // --- Registration -------------------------------------------------------

    /// Register `value` under `patterns`.
    ///
    /// Returns `Ok(None)` when the pattern is empty and was ignored (unless
    /// [`Options::reject_empty_patterns`] is set). Invalid regex syntax is
    /// reported here rather than at compile time.
    pub fn register(&mut self, patterns: impl Into<PatternSet>, value: T) -> Result<Option<PatternId>> {
        match self.prepare(patterns.into())? {
            Some((pattern, shape)) => Ok(Some(self.insert(pattern, shape, value))),
            None => Ok(None),
        }
    }

    /// Register several pairs. Either all of them are registered, or none are.
    pub fn register_many<P, I>(&mut self, pairs: I) -> Result<Vec<PatternId>>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        let mut prepared = Vec::new();
        for (patterns, value) in pairs {
            if let Some((pattern, shape)) = self.prepare(patterns.into())? {
                prepared.push((pattern, shape, value));
            }
        }

        Ok(prepared.into_iter().map(|(pattern, shape, value)| self.insert(pattern, shape, value)).collect())
    }

    fn prepare(&self, patterns: PatternSet) -> Result<Option<(String, Shape)>> {
        let Some(pattern) = patterns.into_pattern()? else {
            if self.options.reject_empty_patterns {
                return Err(DispatchError::EmptyPattern);
            }
            log::trace!("[registry] ignoring empty pattern");
            return Ok(None);
        };

        let shape = inspect(&pattern, &self.options)?;
        Ok(Some((pattern, shape)))
    }

    fn insert(&mut self, pattern: String, shape: Shape, value: T) -> PatternId {
        let id = PatternId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry { pattern, value, shape });
        self.state = CompileState::Dirty;
        id
    }

    // --- Compilation --------------------------------------------------------

    /// Build the batches now instead of on the first lookup. No-op when clean.
    pub fn compile(&mut self) -> Result<()> {
        self.compile_with_metrics().map(|_| ())
    }

    /// Like [`compile`](Self::compile), reporting what was built.
    pub fn compile_with_metrics(&mut self) -> Result<CompileMetrics> {
        if let CompileState::Clean(batches) = &self.state {
            return Ok(CompileMetrics {
                patterns: self.entries.len(),
                batches: batches.len(),
                cached: true,
                ..CompileMetrics::default()
            });
        }

        let start = Instant::now();
        let members: Vec<Member<'_>> = self
            .entries
            .iter()
            .map(|(id, entry)| Member { id: *id, pattern: &entry.pattern, shape: entry.shape })
            .collect();
        let compiled = compile_batches(&members, &self.options)?;

        let metrics = CompileMetrics {
            duration: start.elapsed(),
            patterns: members.len(),
            batches: compiled.batches.len(),
            fallback_batches: compiled.fallback_batches,
            cached: false,
        };
        log::debug!(
            "[registry] compiled {} patterns into {} batches in {:?}",
            metrics.patterns,
            metrics.batches,
            metrics.duration
        );

        self.state = CompileState::Clean(compiled.batches);
        Ok(metrics)
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, CompileState::Clean(_))
    }

    /// Number of compiled batches, or `None` while dirty.
    pub fn batch_count(&self) -> Option<usize> {
        match &self.state {
            CompileState::Clean(batches) => Some(batches.len()),
            CompileState::Dirty => None,
        }
    }

    // --- Matching -----------------------------------------------------------

    /// Find the entry whose pattern matches all of `text`.
    ///
    /// Batches are tried in construction order; within a batch the earliest
    /// registered pattern wins.
    pub fn resolve(&mut self, text: &str) -> Result<Hit> {
        self.compile()?;

        let CompileState::Clean(batches) = &self.state else {
            return Err(DispatchError::no_match(text));
        };

        for (idx, batch) in batches.iter().enumerate() {
            if let Some(hit) = batch.resolve(text) {
                log::trace!("[registry] '{}' matched {:?} in batch {}", text, hit.id, idx);
                return Ok(hit);
            }
        }

        Err(DispatchError::no_match(text))
    }

    /// Resolve `text` to its value and captured groups.
    pub fn lookup(&mut self, text: &str) -> Result<(&T, Groups)> {
        let hit = self.resolve(text)?;
        let entry = self.entries.get(&hit.id).ok_or_else(|| DispatchError::no_match(text))?;
        Ok((&entry.value, hit.groups))
    }

    /// True if some pattern matches `text`.
    pub fn matches(&mut self, text: &str) -> bool {
        self.resolve(text).is_ok()
    }

    // --- Removal ------------------------------------------------------------

    /// Delete the entry that `text` resolves to and return its value.
    pub fn remove(&mut self, text: &str) -> Result<T> {
        let hit = self.resolve(text)?;
        self.remove_id(hit.id).ok_or_else(|| DispatchError::no_match(text))
    }

    pub fn remove_id(&mut self, id: PatternId) -> Option<T> {
        let entry = self.entries.shift_remove(&id)?;
        self.state = CompileState::Dirty;
        Some(entry.value)
    }

    /// Remove every entry and restart ids at 1.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 1;
        self.state = CompileState::Dirty;
    }

    // --- Access -------------------------------------------------------------

    pub fn get(&self, id: PatternId) -> Option<&T> {
        self.entries.get(&id).map(|e| &e.value)
    }

    pub fn pattern(&self, id: PatternId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(pattern, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.values().map(|e| (e.pattern.as_str(), &e.value))
    }

    pub fn ids(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.entries.keys().copied()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(|e| e.pattern.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.values().map(|e| &e.value)
    }

    // --- Interchange --------------------------------------------------------

    /// Pattern → value map in registration order.
    ///
    /// If the same pattern text was registered twice, the first value is kept:
    /// it is the one lookups return, so a reload resolves text the same way.
    pub fn export(&self) -> IndexMap<String, T>
    where
        T: Clone,
    {
        self.distinct().into_iter().map(|(pattern, value)| (pattern.to_string(), value.clone())).collect()
    }

    /// One `(pattern, value)` per distinct pattern text, first registration first.
    pub(crate) fn distinct(&self) -> IndexMap<&str, &T> {
        let mut map = IndexMap::with_capacity(self.entries.len());
        for (pattern, value) in self.iter() {
            map.entry(pattern).or_insert(value);
        }
        map
    }

    /// Replace every entry with `data`, assigning ids from 1.
    ///
    /// All patterns are validated before the current entries are dropped.
    pub fn import<I>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let mut prepared = Vec::new();
        for (pattern, value) in data {
            if let Some((pattern, shape)) = self.prepare(PatternSet::Single(pattern))? {
                prepared.push((pattern, shape, value));
            }
        }

        self.clear();
        for (pattern, shape, value) in prepared {
            self.insert(pattern, shape, value);
        }
        Ok(())
    }

    /// Append copies of all entries in `other`.
    pub fn merge(&mut self, other: &PatternRegistry<T>) -> Result<()>
    where
        T: Clone,
    {
        self.register_many(other.iter().map(|(pattern, value)| (pattern.to_string(), value.clone())))?;
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for PatternRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
