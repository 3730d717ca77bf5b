//! Contexts: a conversational topic with its own vocabulary.
//!
//! A context bundles the patterns that *enter* it, the patterns recognized
//! only while it is active, optional *exit* patterns, ordered chains of
//! expected follow-ups, and nested child contexts.
//!
//! ## Dispatch order
//!
//! [`Context::get_response`] folds the layers into one answer:
//!
//! ```text
//! text ─▶ (1) chain      active chain: step i, else step i-1
//!         │              no chain: step 0 of each chain, in order
//!         ├▶ (2) response  match clears the chain cursor
//!         ├▶ (3) exit      match clears the chain cursor
//!         ├▶ (4) entry     re-entry while already inside
//!         └▶ NoResponse
//! ```
//!
//! ## Chain cursor
//!
//! ```text
//! chain "0" "1" "2" "3"
//!
//! input:   0    1    2    3    3    2    h    3    q
//! value:   0    1    2    3    3    2    -    3    q (response layer)
//! cursor: @1   @2   @3   @3   @3   @3   @3   @3   none
//! ```
//!
//! Starting a chain moves the cursor to step 1 (step 0 for a one-step chain).
//! A match at the cursor advances it until the last step, which then repeats.
//! A miss at the cursor retries the previous step without moving; a miss on
//! both leaves the cursor where it is.

use super::chain::Chain;
use super::probe;
use crate::api::{Dispatch, Found, Layer, Options};
use crate::engine::{Hit, PatternRegistry};
use crate::error::Result;
use crate::patterns::PatternSet;

/// Position of the active chain inside a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainCursor {
    /// Index into the context's chains.
    pub chain: usize,
    /// Step expected next.
    pub step: usize,
}

/// An owned dispatch result; resolved to a value once the mutable pass is over.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub layer: Layer,
    pub hit: Hit,
}

#[derive(Debug, Clone)]
pub struct Context<T> {
    name: Option<String>,
    options: Options,
    entry: PatternRegistry<T>,
    responses: PatternRegistry<T>,
    exits: PatternRegistry<T>,
    chains: Vec<Chain<T>>,
    children: Vec<Context<T>>,
    cursor: Option<ChainCursor>,
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Context<T> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Context {
            name: None,
            entry: PatternRegistry::with_options(options.clone()),
            responses: PatternRegistry::with_options(options.clone()),
            exits: PatternRegistry::with_options(options.clone()),
            chains: Vec::new(),
            children: Vec::new(),
            cursor: None,
            options,
        }
    }

    /// Attach a name used in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    // --- Registration -------------------------------------------------------

    /// Patterns that make this context active when seen.
    pub fn add_entry_phrase(&mut self, patterns: impl Into<PatternSet>, value: T) -> Result<&mut Self> {
        self.entry.register(patterns, value)?;
        Ok(self)
    }

    pub fn add_entry_phrases<P, I>(&mut self, pairs: I) -> Result<&mut Self>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        self.entry.register_many(pairs)?;
        Ok(self)
    }

    /// Patterns recognized only while this context is active.
    pub fn add_response(&mut self, patterns: impl Into<PatternSet>, value: T) -> Result<&mut Self> {
        self.responses.register(patterns, value)?;
        Ok(self)
    }

    pub fn add_responses<P, I>(&mut self, pairs: I) -> Result<&mut Self>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        self.responses.register_many(pairs)?;
        Ok(self)
    }

    /// Patterns that answer and then leave this context (for its parent, or
    /// for no context at top level).
    pub fn add_exit_phrase(&mut self, patterns: impl Into<PatternSet>, value: T) -> Result<&mut Self> {
        self.exits.register(patterns, value)?;
        Ok(self)
    }

    pub fn add_exit_phrases<P, I>(&mut self, pairs: I) -> Result<&mut Self>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        self.exits.register_many(pairs)?;
        Ok(self)
    }

    /// Add a chain: the pairs are expected in order once the first one is seen.
    /// The last step keeps being expected until something else takes over.
    pub fn add_chained_phrases<P, I>(&mut self, pairs: I) -> Result<&mut Self>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        let chain = Chain::build(pairs, &self.options)?;
        self.chains.push(chain);
        Ok(self)
    }

    /// Nest `child` under this context. The child is only reachable while this
    /// context is active.
    pub fn add_context(&mut self, child: Context<T>) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn add_contexts(&mut self, children: impl IntoIterator<Item = Context<T>>) -> &mut Self {
        self.children.extend(children);
        self
    }

    /// Compile every registry here and in nested contexts.
    pub fn compile(&mut self) -> Result<()> {
        self.entry.compile()?;
        self.responses.compile()?;
        self.exits.compile()?;
        for chain in &mut self.chains {
            chain.compile()?;
        }
        for child in &mut self.children {
            child.compile()?;
        }
        Ok(())
    }

    // --- Dispatch -----------------------------------------------------------

    /// Answer `text` from this context's layers, updating the chain cursor.
    pub fn get_response(&mut self, text: &str) -> Dispatch<'_, T> {
        let Some(route) = self.dispatch(text) else {
            return Dispatch::NoResponse;
        };

        match self.value_of(&route) {
            Some(value) => Dispatch::Found(Found { value, groups: route.hit.groups, layer: route.layer }),
            None => Dispatch::NoResponse,
        }
    }

    pub(crate) fn dispatch(&mut self, text: &str) -> Option<Route> {
        if let Some(route) = self.resolve_chain(text) {
            return Some(route);
        }

        if let Some(hit) = probe(&mut self.responses, text) {
            if let Some(cursor) = self.cursor.take() {
                log::debug!("[context:{}] response left chain {} at step {}", self.label(), cursor.chain, cursor.step);
            }
            return Some(Route { layer: Layer::Response, hit });
        }

        if let Some(hit) = probe(&mut self.exits, text) {
            self.cursor = None;
            return Some(Route { layer: Layer::Exit, hit });
        }

        probe(&mut self.entry, text).map(|hit| Route { layer: Layer::Entry, hit })
    }

    fn resolve_chain(&mut self, text: &str) -> Option<Route> {
        let Some(cursor) = self.cursor else {
            return self.start_chain(text);
        };

        let chain = self.chains.get_mut(cursor.chain)?;
        let last = chain.len().saturating_sub(1);

        if let Some(hit) = chain.step_mut(cursor.step).and_then(|step| probe(step, text)) {
            if cursor.step < last {
                self.cursor = Some(ChainCursor { step: cursor.step + 1, ..cursor });
            }
            log::debug!("[context:{}] chain {} matched step {}", self.label(), cursor.chain, cursor.step);
            return Some(Route { layer: Layer::Chain { chain: cursor.chain, step: cursor.step }, hit });
        }

        if cursor.step > 0 {
            let back = cursor.step - 1;
            if let Some(hit) = chain.step_mut(back).and_then(|step| probe(step, text)) {
                log::debug!("[context:{}] chain {} fell back to step {}", self.label(), cursor.chain, back);
                return Some(Route { layer: Layer::Chain { chain: cursor.chain, step: back }, hit });
            }
        }

        None
    }

    fn start_chain(&mut self, text: &str) -> Option<Route> {
        for (idx, chain) in self.chains.iter_mut().enumerate() {
            let Some(hit) = chain.step_mut(0).and_then(|step| probe(step, text)) else {
                continue;
            };

            let next = if chain.len() > 1 { 1 } else { 0 };
            self.cursor = Some(ChainCursor { chain: idx, step: next });
            log::debug!("[context:{}] started chain {}", self.name.as_deref().unwrap_or("<unnamed>"), idx);
            return Some(Route { layer: Layer::Chain { chain: idx, step: 0 }, hit });
        }

        None
    }

    /// Resolve a route produced by [`dispatch`](Self::dispatch) to its value.
    pub(crate) fn value_of(&self, route: &Route) -> Option<&T> {
        let registry = match route.layer {
            Layer::Chain { chain, step } => self.chains.get(chain)?.step(step)?,
            Layer::Response => &self.responses,
            Layer::Exit => &self.exits,
            Layer::Entry => &self.entry,
            Layer::Contextless => return None,
        };
        registry.get(route.hit.id)
    }

    // --- State and access ---------------------------------------------------

    pub fn cursor(&self) -> Option<ChainCursor> {
        self.cursor
    }

    /// Forget the active chain, if any.
    pub fn reset_chain(&mut self) {
        self.cursor = None;
    }

    pub fn entry(&self) -> &PatternRegistry<T> {
        &self.entry
    }

    pub fn responses(&self) -> &PatternRegistry<T> {
        &self.responses
    }

    pub fn exits(&self) -> &PatternRegistry<T> {
        &self.exits
    }

    pub fn chains(&self) -> &[Chain<T>] {
        &self.chains
    }

    pub fn contexts(&self) -> &[Context<T>] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Context<T>] {
        &mut self.children
    }
}

/// Find the first context in `contexts` whose entry patterns match `text`.
///
/// The entered context starts without an active chain.
pub(crate) fn enter_any<T>(contexts: &mut [Context<T>], text: &str) -> Option<(usize, Hit)> {
    for (idx, context) in contexts.iter_mut().enumerate() {
        if let Some(hit) = probe(&mut context.entry, text) {
            context.reset_chain();
            log::debug!("[context:{}] entered", context.label());
            return Some((idx, hit));
        }
    }
    None
}

/// Walk a path of child indices from a list of root contexts.
pub(crate) fn context_at<'a, T>(roots: &'a [Context<T>], path: &[usize]) -> Option<&'a Context<T>> {
    let (first, rest) = path.split_first()?;
    let mut context = roots.get(*first)?;
    for idx in rest {
        context = context.children.get(*idx)?;
    }
    Some(context)
}

pub(crate) fn context_at_mut<'a, T>(roots: &'a mut [Context<T>], path: &[usize]) -> Option<&'a mut Context<T>> {
    let (first, rest) = path.split_first()?;
    let mut context = roots.get_mut(*first)?;
    for idx in rest {
        context = context.children.get_mut(*idx)?;
    }
    Some(context)
}
