//! Conversation state on top of the pattern engine.
//!
//! ## How the parts work together
//!
//! ```text
//! Responder
//!   ├─ contextless responses      PatternRegistry<T>
//!   ├─ default value              Option<T>
//!   └─ contexts                   Vec<Context<T>>
//!        Context
//!          ├─ entry / responses / exits   PatternRegistry<T> each
//!          ├─ chains                      Vec<Chain<T>>  (one registry per step)
//!          ├─ cursor                      Option<ChainCursor>
//!          └─ children                    Vec<Context<T>>
//! ```
//!
//! Every layer answers through [`probe`]: a miss is `None`, never an error, so
//! the "nothing matched" case cannot leak out of a reply.
//!
//! ## Responsibilities by module
//!
//! - `chain.rs`: ordered steps, built and validated at registration.
//! - `context.rs`: per-context layering and the chain cursor.
//! - `responder.rs`: the active context path, contextless responses, and the
//!   default/echo fallback.

#[path = "dialog/chain.rs"]
mod chain;
#[path = "dialog/context.rs"]
mod context;
#[path = "dialog/responder.rs"]
mod responder;

#[cfg(test)]
#[path = "dialog/tests.rs"]
mod tests;

pub use chain::Chain;
pub use context::{ChainCursor, Context};
pub use responder::Responder;

use crate::engine::{Hit, PatternRegistry};

/// Resolve `text` against one layer, treating a miss as `None`.
///
/// Empty registries are skipped without compiling. Errors other than
/// "nothing matched" only come from a batch the regex engine refused; they
/// are logged and the layer is treated as silent.
pub(crate) fn probe<T>(registry: &mut PatternRegistry<T>, text: &str) -> Option<Hit> {
    if registry.is_empty() {
        return None;
    }

    match registry.resolve(text) {
        Ok(hit) => Some(hit),
        Err(err) if err.is_no_match() => None,
        Err(err) => {
            log::warn!("[dialog] layer skipped for '{}': {}", text, err);
            None
        }
    }
}
