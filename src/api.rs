use serde::{Deserialize, Serialize};

/// Default number of patterns combined into one compiled alternation.
pub const DEFAULT_BATCH_SIZE: usize = 600;

/// Default compiled-program size limit handed to the regex engine, per batch.
pub const DEFAULT_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Options that affect how patterns are validated and compiled.
///
/// Every registry owns a copy; [`Context`](crate::Context) and
/// [`Responder`](crate::Responder) pass theirs down to each registry they create.
/// Options deserialize with defaults for missing fields, so a partial config
/// document is enough:
///
/// ```
/// use colloquy::Options;
///
/// let opts: Options = serde_json::from_str(r#"{"batch_size": 75}"#).unwrap();
/// assert_eq!(opts.batch_size, 75);
/// assert!(opts.case_insensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum number of patterns per compiled batch. Values below 1 act as 1.
    pub batch_size: usize,
    /// Match case-insensitively.
    pub case_insensitive: bool,
    /// Size limit (bytes) for each compiled regex program.
    pub size_limit: usize,
    /// Report empty patterns as [`DispatchError::EmptyPattern`](crate::DispatchError::EmptyPattern)
    /// instead of silently ignoring them.
    pub reject_empty_patterns: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            batch_size: DEFAULT_BATCH_SIZE,
            case_insensitive: true,
            size_limit: DEFAULT_SIZE_LIMIT,
            reject_empty_patterns: false,
        }
    }
}

impl Options {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_reject_empty_patterns(mut self, reject: bool) -> Self {
        self.reject_empty_patterns = reject;
        self
    }

    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Captured sub-groups of the winning pattern, in order.
///
/// Groups that did not take part in the match are `None`. The dispatch group
/// wrapping each pattern is never included.
pub type Groups = Vec<Option<String>>;

/// Which dispatch layer produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Step `step` of chain `chain` in the answering context.
    Chain { chain: usize, step: usize },
    /// The answering context's response patterns.
    Response,
    /// The answering context's exit patterns.
    Exit,
    /// The answering context's entry patterns.
    Entry,
    /// The responder's contextless patterns.
    Contextless,
}

/// A value found by a dispatch layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a, T> {
    pub value: &'a T,
    pub groups: Groups,
    pub layer: Layer,
}

/// Result of [`Context::get_response`](crate::Context::get_response).
///
/// `NoResponse` is a distinct state rather than an "empty" value, so values such
/// as `0`, `false` or `""` are returned like any other.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<'a, T> {
    Found(Found<'a, T>),
    NoResponse,
}

impl<'a, T> Dispatch<'a, T> {
    pub fn value(&self) -> Option<&'a T> {
        match self {
            Dispatch::Found(found) => Some(found.value),
            Dispatch::NoResponse => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Dispatch::Found(_))
    }
}

/// Result of [`Responder::get_response`](crate::Responder::get_response).
///
/// A responder always answers: with a matched value, with its default value,
/// or by echoing the input back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<'a, T> {
    Matched { value: &'a T, groups: Groups, layer: Layer },
    Default(&'a T),
    Echo(String),
}

impl<'a, T> Reply<'a, T> {
    /// The matched or default value; `None` for an echo.
    pub fn value(&self) -> Option<&'a T> {
        match self {
            Reply::Matched { value, .. } => Some(*value),
            Reply::Default(value) => Some(*value),
            Reply::Echo(_) => None,
        }
    }

    pub fn groups(&self) -> &[Option<String>] {
        match self {
            Reply::Matched { groups, .. } => groups.as_slice(),
            _ => &[],
        }
    }

    pub fn layer(&self) -> Option<Layer> {
        match self {
            Reply::Matched { layer, .. } => Some(*layer),
            _ => None,
        }
    }

    /// The echoed input, if nothing matched and no default is set.
    pub fn echo(&self) -> Option<&str> {
        match self {
            Reply::Echo(text) => Some(text),
            _ => None,
        }
    }
}
