//! The top-level responder: contextless patterns, contexts, and fallbacks.
//!
//! ## Decision order
//!
//! ```text
//! get_response(text)
//!   (1) active context path p = [i, j, ...]
//!       for d = len(p) .. 1 (deepest first), context c = p[..d]:
//!         c.dispatch(text)        chain / response / exit / entry
//!           match      -> active = p[..d]   (exit: active = p[..d-1])
//!         c's children entry
//!           match      -> active = p[..d] + [child]
//!   (2) contextless patterns      match -> active = none
//!   (3) top-level context entry   match -> active = [k]
//!   (4) default value, else echo the input
//! ```
//!
//! Transitions happen only on a successful match; a miss never changes
//! which context is active.

use super::context::{Context, Route, context_at, context_at_mut, enter_any};
use super::probe;
use crate::api::{Layer, Options, Reply};
use crate::engine::PatternRegistry;
use crate::error::Result;
use crate::patterns::PatternSet;

/// Where a routed value lives.
#[derive(Debug, Clone)]
enum Owner {
    Contextless,
    Context(Vec<usize>),
}

#[derive(Debug, Clone)]
struct Routed {
    owner: Owner,
    route: Route,
}

/// Holds the conversation state for one conversation at a time.
///
/// `get_response` takes `&mut self`: resolving text moves the active context
/// and chain cursors, so a responder shared between threads needs external
/// locking. Independent responders share nothing.
///
/// ```
/// use colloquy::{Context, Reply, Responder};
///
/// let mut cats = Context::new().named("cats");
/// cats.add_entry_phrase("(.* )?talk about cats.*", "Sure, I love cats").unwrap();
/// cats.add_response("(.* )?favou?rite thing about (them|cats).*", "They are fuzzy").unwrap();
///
/// let mut bot = Responder::new();
/// bot.add_response("(.* )?hello.*", "Hello!").unwrap();
/// bot.add_context(cats);
///
/// assert_eq!(bot.get_response("let's talk about cats").value(), Some(&"Sure, I love cats"));
/// assert_eq!(bot.get_response("what's your favourite thing about them?").value(), Some(&"They are fuzzy"));
/// assert_eq!(bot.get_response("oh hello").value(), Some(&"Hello!"));
/// assert_eq!(bot.get_response("favourite thing about them"), Reply::Echo("favourite thing about them".into()));
/// ```
#[derive(Debug, Clone)]
pub struct Responder<T> {
    options: Options,
    responses: PatternRegistry<T>,
    default: Option<T>,
    contexts: Vec<Context<T>>,
    active: Option<Vec<usize>>,
}

impl<T> Default for Responder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Responder<T> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Responder {
            responses: PatternRegistry::with_options(options.clone()),
            default: None,
            contexts: Vec::new(),
            active: None,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // --- Registration -------------------------------------------------------

    /// Value returned when nothing matches (instead of echoing the input).
    pub fn add_default_response(&mut self, value: T) -> &mut Self {
        self.default = Some(value);
        self
    }

    pub fn default_response(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Patterns recognized in any state. A match leaves the active context.
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

    pub fn add_context(&mut self, context: Context<T>) -> &mut Self {
        self.contexts.push(context);
        self
    }

    pub fn add_contexts(&mut self, contexts: impl IntoIterator<Item = Context<T>>) -> &mut Self {
        self.contexts.extend(contexts);
        self
    }

    /// Compile every registry up front so the first reply pays no compile cost.
    pub fn compile(&mut self) -> Result<()> {
        self.responses.compile()?;
        for context in &mut self.contexts {
            context.compile()?;
        }
        Ok(())
    }

    // --- Dispatch -----------------------------------------------------------

    /// Answer `text`. Always produces a reply.
    pub fn get_response(&mut self, text: &str) -> Reply<'_, T> {
        if let Some(routed) = self.route(text) {
            if let Some(value) = self.value_of(&routed) {
                return Reply::Matched { value, groups: routed.route.hit.groups, layer: routed.route.layer };
            }
        }

        match &self.default {
            Some(value) => {
                log::debug!("[responder] no match for '{}', using default", text);
                Reply::Default(value)
            }
            None => {
                log::debug!("[responder] no match for '{}', echoing", text);
                Reply::Echo(text.to_string())
            }
        }
    }

    fn route(&mut self, text: &str) -> Option<Routed> {
        if let Some(path) = self.active.clone() {
            if let Some(routed) = self.route_active(&path, text) {
                return Some(routed);
            }
        }

        if let Some(hit) = probe(&mut self.responses, text) {
            if let Some(path) = self.active.take() {
                log::debug!("[responder] contextless match left context {:?}", path);
                self.reset_path(&path);
            }
            return Some(Routed { owner: Owner::Contextless, route: Route { layer: Layer::Contextless, hit } });
        }

        let (idx, hit) = enter_any(&mut self.contexts, text)?;
        self.active = Some(vec![idx]);
        Some(Routed { owner: Owner::Context(vec![idx]), route: Route { layer: Layer::Entry, hit } })
    }

    fn route_active(&mut self, path: &[usize], text: &str) -> Option<Routed> {
        for depth in (1..=path.len()).rev() {
            let prefix = &path[..depth];
            let context = context_at_mut(&mut self.contexts, prefix)?;

            if let Some(route) = context.dispatch(text) {
                self.active = if route.layer == Layer::Exit {
                    log::debug!("[responder] exit phrase left context {}", context.label());
                    context.reset_chain();
                    (depth > 1).then(|| path[..depth - 1].to_vec())
                } else {
                    Some(prefix.to_vec())
                };
                return Some(Routed { owner: Owner::Context(prefix.to_vec()), route });
            }

            if let Some((child, hit)) = enter_any(context.children_mut(), text) {
                let mut child_path = prefix.to_vec();
                child_path.push(child);
                self.active = Some(child_path.clone());
                return Some(Routed { owner: Owner::Context(child_path), route: Route { layer: Layer::Entry, hit } });
            }
        }

        None
    }

    fn reset_path(&mut self, path: &[usize]) {
        for depth in 1..=path.len() {
            if let Some(context) = context_at_mut(&mut self.contexts, &path[..depth]) {
                context.reset_chain();
            }
        }
    }

    fn value_of(&self, routed: &Routed) -> Option<&T> {
        match &routed.owner {
            Owner::Contextless => self.responses.get(routed.route.hit.id),
            Owner::Context(path) => context_at(&self.contexts, path)?.value_of(&routed.route),
        }
    }

    // --- State and access ---------------------------------------------------

    pub fn active_context(&self) -> Option<&Context<T>> {
        context_at(&self.contexts, self.active.as_deref()?)
    }

    /// Child indices from the top-level contexts down to the active context.
    pub fn active_path(&self) -> Option<&[usize]> {
        self.active.as_deref()
    }

    /// Leave the active context, if any.
    pub fn exit_context(&mut self) {
        if let Some(path) = self.active.take() {
            self.reset_path(&path);
        }
    }

    pub fn responses(&self) -> &PatternRegistry<T> {
        &self.responses
    }

    pub fn contexts(&self) -> &[Context<T>] {
        &self.contexts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrases;

    #[test]
    fn compile_reaches_contexts() {
        let mut responder = Responder::new();
        responder.add_response("f?", 0).unwrap();

        let mut c1 = Context::new();
        c1.add_entry_phrase("a+", 1).unwrap().add_response("b+", 2).unwrap();
        c1.add_chained_phrases(phrases!["x" => 3, "y" => 4, "z" => 5]).unwrap();
        let mut c2 = Context::new();
        c2.add_entry_phrase("q+", 6).unwrap().add_response("t*", 7).unwrap();
        responder.add_contexts([c1, c2]);

        assert!(!responder.responses().is_compiled());
        assert!(responder.contexts().iter().all(|c| !c.entry().is_compiled() && !c.responses().is_compiled()));

        responder.compile().unwrap();

        assert_eq!(responder.responses().batch_count(), Some(1));
        for context in responder.contexts() {
            assert!(context.entry().is_compiled());
            assert!(context.responses().is_compiled());
            assert!(context.chains().iter().all(|chain| chain.steps().all(PatternRegistry::is_compiled)));
        }
    }

    #[test]
    fn context_precedence() {
        let mut ctx = Context::new();
        ctx.add_entry_phrase("e", 1).unwrap().add_response("f", 2).unwrap();

        let mut responder = Responder::new();
        responder.add_response("a", 3).unwrap();
        responder.add_context(ctx);

        assert_eq!(responder.get_response("a").value(), Some(&3));
        assert!(responder.active_path().is_none());

        assert_eq!(responder.get_response("e").value(), Some(&1));
        assert_eq!(responder.active_path(), Some(&[0][..]));
        assert_eq!(responder.get_response("f").value(), Some(&2));

        let reply = responder.get_response("a");
        assert_eq!(reply.layer(), Some(Layer::Contextless));
        assert_eq!(reply.value(), Some(&3));
        assert!(responder.active_context().is_none());

        assert_eq!(responder.get_response("f"), Reply::Echo("f".to_string()));
    }

    #[test]
    fn default_and_echo_fallbacks() {
        let mut responder: Responder<&str> = Responder::new();
        assert_eq!(responder.get_response("anything at all"), Reply::Echo("anything at all".to_string()));

        responder.add_default_response("Mmhmm.");
        assert_eq!(responder.get_response("anything at all"), Reply::Default(&"Mmhmm."));
        assert_eq!(responder.default_response(), Some(&"Mmhmm."));
    }

    #[test]
    fn falsy_contextless_value_is_returned() {
        let mut responder = Responder::new();
        responder.add_response("zero", 0).unwrap();
        responder.add_default_response(42);
        assert_eq!(responder.get_response("zero").value(), Some(&0));
    }

    #[test]
    fn groups_reach_the_caller() {
        let mut responder = Responder::new();
        responder.add_response("(.* )?bedtime is (.*)", "set_bedtime").unwrap();

        let reply = responder.get_response("ok, remember that my bedtime is 23:00");
        assert_eq!(reply.value(), Some(&"set_bedtime"));
        assert_eq!(reply.groups()[1].as_deref(), Some("23:00"));
    }

    #[test]
    fn entering_a_context_resets_its_chain() {
        let mut ctx = Context::new();
        ctx.add_entry_phrase("story", "once upon a time").unwrap();
        ctx.add_chained_phrases(phrases!["and then\\??" => "a dragon", "and then\\??" => "the end"]).unwrap();

        let mut responder = Responder::new();
        responder.add_response("stop", "ok").unwrap();
        responder.add_context(ctx);

        assert_eq!(responder.get_response("story").value(), Some(&"once upon a time"));
        assert_eq!(responder.get_response("and then?").value(), Some(&"a dragon"));
        assert_eq!(responder.get_response("stop").value(), Some(&"ok"));
        assert!(responder.contexts()[0].cursor().is_none());

        assert_eq!(responder.get_response("story").value(), Some(&"once upon a time"));
        assert_eq!(responder.get_response("and then").value(), Some(&"a dragon"));
        assert_eq!(responder.get_response("and then").value(), Some(&"the end"));
    }

    #[test]
    fn exit_context_is_explicit() {
        let mut ctx = Context::new();
        ctx.add_entry_phrase("in", 1).unwrap().add_response("here", 2).unwrap();

        let mut responder = Responder::new();
        responder.add_context(ctx);
        responder.get_response("in");
        assert!(responder.active_context().is_some());

        responder.exit_context();
        assert!(responder.active_context().is_none());
        assert_eq!(responder.get_response("here"), Reply::Echo("here".to_string()));
    }
}
