//! Error types shared by the registry and the dialog layers.
//!
//! Only two classes of failure reach callers in normal use:
//!
//! - `NoMatch` from direct registry calls ([`PatternRegistry::lookup`],
//!   [`PatternRegistry::remove`]). Inside [`Responder::get_response`] it is
//!   consumed at every layer boundary and never escapes.
//! - Validation errors from registration calls. These leave existing state
//!   untouched.
//!
//! [`PatternRegistry::lookup`]: crate::PatternRegistry::lookup
//! [`PatternRegistry::remove`]: crate::PatternRegistry::remove
//! [`Responder::get_response`]: crate::Responder::get_response

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No registered pattern matches the whole input.
    #[error("no pattern matches '{text}'")]
    NoMatch { text: String },

    /// A pattern list was supplied with no members.
    #[error("pattern list must contain at least one pattern")]
    EmptyPatternList,

    /// An empty pattern was registered while `Options::reject_empty_patterns` is set,
    /// or an empty pattern was used as a chain step.
    #[error("empty pattern")]
    EmptyPattern,

    /// The pattern is not valid syntax for the matching engine.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A chain was declared with no steps.
    #[error("chain must contain at least one step")]
    EmptyChain,

    /// The engine rejected a compiled batch even after splitting it.
    #[error("failed to compile batch {batch} ({patterns} patterns): {reason}")]
    BatchCompile { batch: usize, patterns: usize, reason: String },

    /// Export/import through serde failed.
    #[error("persistence error: {0}")]
    Persist(String),
}

impl DispatchError {
    pub(crate) fn no_match(text: &str) -> Self {
        DispatchError::NoMatch { text: text.to_string() }
    }

    /// True for the recoverable "nothing matched" case.
    pub fn is_no_match(&self) -> bool {
        matches!(self, DispatchError::NoMatch { .. })
    }

    /// True for errors raised while validating a registration call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DispatchError::EmptyPatternList
                | DispatchError::EmptyPattern
                | DispatchError::InvalidPattern { .. }
                | DispatchError::EmptyChain
        )
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Persist(err.to_string())
    }
}
