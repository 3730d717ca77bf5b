//! Rule-based, context-aware conversational dispatch.
//!
//! Regular-expression patterns map input text to response values. Contexts
//! narrow what is recognized next, and chains expect follow-up phrases in a
//! fixed order.
//!
//! ```text
//! text ─▶ Responder ─▶ active Context (deepest first) ─▶ contextless ─▶ entry ─▶ default / echo
//!                          │
//!                          └─ chain ─▶ responses ─▶ exits ─▶ entry ─▶ child entry
//! ```
//!
//! The building block is [`PatternRegistry`]: an ordered `pattern → value`
//! store compiled into a few large alternations. Patterns are matched against
//! the whole input and case-insensitively unless [`Options`] says otherwise.
//!
//! ```
//! use colloquy::{PatternRegistry, Responder};
//!
//! let mut reg = PatternRegistry::new();
//! reg.register("(.*) (.*) (.*)", "three words").unwrap();
//! let (value, groups) = reg.lookup("hello world !").unwrap();
//! assert_eq!(*value, "three words");
//! assert_eq!(groups[2].as_deref(), Some("!"));
//!
//! let mut bot = Responder::new();
//! bot.add_response("(.* )?hello.*", "Hi!").unwrap();
//! assert_eq!(bot.get_response("well hello").value(), Some(&"Hi!"));
//! assert_eq!(bot.get_response("unknown").echo(), Some("unknown"));
//! ```

#[macro_use]
mod macros;
mod api;
mod dialog;
mod engine;
mod error;
mod patterns;

pub use api::{DEFAULT_BATCH_SIZE, DEFAULT_SIZE_LIMIT, Dispatch, Found, Groups, Layer, Options, Reply};
pub use dialog::{Chain, ChainCursor, Context, Responder};
pub use engine::{CompileMetrics, Hit, PatternId, PatternRegistry, export_json, import_json};
pub use error::{DispatchError, Result};
pub use patterns::PatternSet;
