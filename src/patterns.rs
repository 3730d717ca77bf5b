//! Pattern arguments accepted by the registration API.
//!
//! A registration call takes either one pattern or an ordered list of
//! alternatives. Lists are folded into a single alternation before they reach
//! a registry, so one list registers exactly one entry.

use crate::error::{DispatchError, Result};

/// One pattern, or a non-empty list of alternative patterns.
///
/// ```
/// use colloquy::PatternSet;
///
/// let one = PatternSet::from("hello+");
/// let many = PatternSet::from(["hi", "hello"]);
/// assert_eq!(one.into_pattern().unwrap().as_deref(), Some("hello+"));
/// assert_eq!(many.into_pattern().unwrap().as_deref(), Some("(?:hi)|(?:hello)"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSet {
    Single(String),
    Alternatives(Vec<String>),
}

impl PatternSet {
    /// Fold into the pattern text that gets registered.
    ///
    /// Returns `Ok(None)` for an empty single pattern, which has nothing to
    /// register. Empty members of a list are kept as `(?:)`, so a list such as
    /// `["", "x"]` also matches empty input.
    pub fn into_pattern(self) -> Result<Option<String>> {
        match self {
            PatternSet::Single(pattern) => Ok((!pattern.is_empty()).then_some(pattern)),
            PatternSet::Alternatives(list) => {
                if list.is_empty() {
                    return Err(DispatchError::EmptyPatternList);
                }

                let members: Vec<String> = list.into_iter().map(|p| format!("(?:{p})")).collect();
                Ok(Some(members.join("|")))
            }
        }
    }
}

impl From<&str> for PatternSet {
    fn from(pattern: &str) -> Self {
        PatternSet::Single(pattern.to_string())
    }
}

impl From<String> for PatternSet {
    fn from(pattern: String) -> Self {
        PatternSet::Single(pattern)
    }
}

impl From<&String> for PatternSet {
    fn from(pattern: &String) -> Self {
        PatternSet::Single(pattern.clone())
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(list: Vec<String>) -> Self {
        PatternSet::Alternatives(list)
    }
}

impl From<Vec<&str>> for PatternSet {
    fn from(list: Vec<&str>) -> Self {
        PatternSet::Alternatives(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PatternSet {
    fn from(list: &[&str]) -> Self {
        PatternSet::Alternatives(list.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PatternSet {
    fn from(list: [&str; N]) -> Self {
        PatternSet::Alternatives(list.iter().map(|p| p.to_string()).collect())
    }
}
