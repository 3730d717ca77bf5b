//! Chains: ordered follow-up steps inside a context.
//!
//! A chain is a fixed list of single-entry registries. It has no matching
//! policy of its own; the owning [`Context`](crate::Context) keeps the cursor
//! and decides which step to try.

use crate::api::Options;
use crate::engine::PatternRegistry;
use crate::error::{DispatchError, Result};
use crate::patterns::PatternSet;

#[derive(Debug, Clone)]
pub struct Chain<T> {
    steps: Vec<PatternRegistry<T>>,
}

impl<T> Chain<T> {
    /// Build a chain with one step per pair. Every step must have a pattern.
    pub(crate) fn build<P, I>(pairs: I, options: &Options) -> Result<Self>
    where
        P: Into<PatternSet>,
        I: IntoIterator<Item = (P, T)>,
    {
        let step_options = options.clone().with_reject_empty_patterns(true);
        let mut steps = Vec::new();

        for (patterns, value) in pairs {
            let mut step = PatternRegistry::with_options(step_options.clone());
            step.register(patterns, value)?;
            steps.push(step);
        }

        if steps.is_empty() {
            return Err(DispatchError::EmptyChain);
        }

        Ok(Chain { steps })
    }

    pub fn step(&self, index: usize) -> Option<&PatternRegistry<T>> {
        self.steps.get(index)
    }

    pub(crate) fn step_mut(&mut self, index: usize) -> Option<&mut PatternRegistry<T>> {
        self.steps.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &PatternRegistry<T>> + '_ {
        self.steps.iter()
    }

    pub fn compile(&mut self) -> Result<()> {
        self.steps.iter_mut().try_for_each(PatternRegistry::compile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_registry_per_step() {
        let mut chain = Chain::build(vec![("x", 3), ("y|why", 4), ("z", 5)], &Options::default()).unwrap();
        assert_eq!(chain.len(), 3);
        assert!(chain.steps().all(|step| step.len() == 1));
        assert_eq!(chain.step(1).and_then(|s| s.patterns().next()), Some("y|why"));

        chain.compile().unwrap();
        assert!(chain.steps().all(PatternRegistry::is_compiled));
    }

    #[test]
    fn empty_chains_and_steps_are_rejected() {
        let none: Vec<(&str, i32)> = Vec::new();
        assert_eq!(Chain::build(none, &Options::default()).unwrap_err(), DispatchError::EmptyChain);
        assert_eq!(Chain::build(vec![("a", 1), ("", 2)], &Options::default()).unwrap_err(), DispatchError::EmptyPattern);
    }
}
