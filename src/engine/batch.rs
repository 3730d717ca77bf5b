//! Batch compilation.
//!
//! This module holds the *compiled* side of a registry: the list of regexes
//! derived from its entries, each covering up to `batch_size` patterns.
//!
//! ## Layout of one batch
//!
//! Every member pattern is wrapped in one capturing *slot group*, anchored on
//! both sides, and the wrapped members are joined by alternation:
//!
//! ```text
//! members:  [#1 "hi|hello"]  [#2 "(.*) is (.*)"]  [#3 "bye"]
//!
//! regex:    (^(?:hi|hello)$)|(^(?:(.*) is (.*))$)|(^(?:bye)$)
//! slots:     1                 2      3     4       5
//!
//! side table: Branch { id: #1, slot: 1, groups: 0 }
//!             Branch { id: #2, slot: 2, groups: 2 }
//!             Branch { id: #3, slot: 5, groups: 0 }
//! ```
//!
//! A match is mapped back to its entry by finding the slot group that took
//! part in it; the member's own groups are the `groups` slots right after it.
//! No named groups are used, so labels never collide across batches.
//!
//! ## Invariants
//!
//! - `Batch::branches` is sorted by `slot`, in member order.
//! - Each slot group matches the whole input or nothing: the anchors sit
//!   outside the member's non-capturing group, so a top-level `|` inside a
//!   member cannot escape them.
//! - A member whose text ends inside a verbose-mode `#` comment gets a line
//!   break before its closing `)$)`, otherwise the comment would swallow it.
//!   [`inspect`] decides this once at registration by compiling the member in
//!   its wrapped form, so a pattern that cannot be anchored never reaches a
//!   batch.
//! - If the engine rejects a combined batch (for example two members reuse a
//!   capture-group name), the chunk is rebuilt as one batch per member. Member
//!   order and matching semantics are preserved.

use super::PatternId;
use crate::api::{Groups, Options};
use crate::error::{DispatchError, Result};
use regex::{Regex, RegexBuilder};

/// What registration learned about a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shape {
    /// Capturing groups inside the pattern.
    pub groups: usize,
    /// The pattern ends in a verbose-mode comment and needs a line break
    /// before anything is appended.
    pub line_end: bool,
}

/// A registry entry as seen by the batch builder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Member<'a> {
    pub id: PatternId,
    pub pattern: &'a str,
    pub shape: Shape,
}

/// Side-table row: which slot group belongs to which entry.
#[derive(Debug, Clone)]
struct Branch {
    id: PatternId,
    slot: usize,
    groups: usize,
}

/// A successful batch match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub id: PatternId,
    pub groups: Groups,
}

#[derive(Debug, Clone)]
pub(crate) struct Batch {
    regex: Regex,
    branches: Vec<Branch>,
}

impl Batch {
    /// Compile one batch from `members`.
    fn build(members: &[Member<'_>], options: &Options) -> Result<Batch, regex::Error> {
        let mut source = String::new();
        let mut branches = Vec::with_capacity(members.len());
        let mut slot = 1;

        for (idx, member) in members.iter().enumerate() {
            if idx > 0 {
                source.push('|');
            }
            push_wrapped(&mut source, member.pattern, member.shape.line_end);

            branches.push(Branch { id: member.id, slot, groups: member.shape.groups });
            slot += 1 + member.shape.groups;
        }

        let regex = builder(&source, options).build()?;
        Ok(Batch { regex, branches })
    }

    /// Match `text` against this batch.
    pub(crate) fn resolve(&self, text: &str) -> Option<Hit> {
        let caps = self.regex.captures(text)?;
        let branch = self.branches.iter().find(|b| caps.get(b.slot).is_some())?;

        let groups = (branch.slot + 1..=branch.slot + branch.groups)
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();

        Some(Hit { id: branch.id, groups })
    }

    pub(crate) fn len(&self) -> usize {
        self.branches.len()
    }
}

/// Output of [`compile_batches`].
pub(crate) struct Compiled {
    pub batches: Vec<Batch>,
    pub fallback_batches: usize,
}

/// Build the batch list for `members`, in order, `batch_size` members per batch.
pub(crate) fn compile_batches(members: &[Member<'_>], options: &Options) -> Result<Compiled> {
    let mut batches = Vec::new();
    let mut fallback_batches = 0;

    for chunk in members.chunks(options.effective_batch_size()) {
        match Batch::build(chunk, options) {
            Ok(batch) => {
                log::trace!("[batch] #{} compiled with {} patterns", batches.len(), batch.len());
                batches.push(batch);
            }
            Err(err) if chunk.len() > 1 => {
                log::warn!(
                    "[batch] #{} rejected by the regex engine ({}); splitting {} patterns into single batches",
                    batches.len(),
                    first_line(&err.to_string()),
                    chunk.len()
                );
                for member in chunk {
                    let batch = Batch::build(std::slice::from_ref(member), options)
                        .map_err(|err| batch_error(batches.len(), 1, &err))?;
                    batches.push(batch);
                    fallback_batches += 1;
                }
            }
            Err(err) => return Err(batch_error(batches.len(), chunk.len(), &err)),
        }
    }

    Ok(Compiled { batches, fallback_batches })
}

/// Validate a single pattern, count its capturing groups, and check that it
/// still compiles once wrapped as a batch member.
pub(crate) fn inspect(pattern: &str, options: &Options) -> Result<Shape> {
    let invalid = |reason: String| DispatchError::InvalidPattern { pattern: pattern.to_string(), reason };

    let regex = builder(pattern, options).build().map_err(|err| invalid(err.to_string()))?;
    let groups = regex.captures_len() - 1;

    let wrapped = |line_end: bool| {
        let mut source = String::new();
        push_wrapped(&mut source, pattern, line_end);
        builder(&source, options).build()
    };

    // A line break is only added when the plain form fails, which means the
    // tail is a verbose comment and the break is insignificant whitespace.
    let line_end = match wrapped(false) {
        Ok(_) => false,
        Err(plain) => match wrapped(true) {
            Ok(_) => true,
            Err(_) => return Err(invalid(format!("cannot be anchored: {}", first_line(&plain.to_string())))),
        },
    };

    Ok(Shape { groups, line_end })
}

fn push_wrapped(source: &mut String, pattern: &str, line_end: bool) {
    source.push_str("(^(?:");
    source.push_str(pattern);
    if line_end {
        source.push('\n');
    }
    source.push_str(")$)");
}

fn builder(source: &str, options: &Options) -> RegexBuilder {
    let mut builder = RegexBuilder::new(source);
    builder.case_insensitive(options.case_insensitive).size_limit(options.size_limit);
    builder
}

fn batch_error(batch: usize, patterns: usize, err: &regex::Error) -> DispatchError {
    DispatchError::BatchCompile { batch, patterns, reason: err.to_string() }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members<'a>(patterns: &[&'a str]) -> Vec<Member<'a>> {
        patterns
            .iter()
            .enumerate()
            .map(|(i, p)| Member { id: PatternId(i as u64 + 1), pattern: *p, shape: inspect(p, &Options::default()).unwrap() })
            .collect()
    }

    #[test]
    fn inspect_counts_groups() {
        let opts = Options::default();
        assert_eq!(inspect("abc", &opts).unwrap().groups, 0);
        assert_eq!(inspect("(a)(?:b)(?P<c>c)", &opts).unwrap().groups, 2);
    }

    #[test]
    fn inspect_rejects_bad_syntax() {
        let err = inspect("(unclosed", &Options::default()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPattern { .. }));
    }

    #[test]
    fn trailing_verbose_comment_gets_a_line_end() {
        let opts = Options::default();
        assert_eq!(inspect("(?x) bye # farewell", &opts).unwrap(), Shape { groups: 0, line_end: true });
        assert!(!inspect("(?x) b y e", &opts).unwrap().line_end);
        assert!(!inspect("bye # not a comment", &opts).unwrap().line_end);
    }

    #[test]
    fn verbose_members_share_a_batch() {
        let ms = members(&["hello", "(?x) (good \\s)? bye # farewell", "see # you"]);
        let compiled = compile_batches(&ms, &Options::default()).unwrap();
        assert_eq!(compiled.batches.len(), 1);
        assert_eq!(compiled.fallback_batches, 0);

        let batch = &compiled.batches[0];
        assert_eq!(batch.resolve("hello").unwrap().id, PatternId(1));
        assert_eq!(batch.resolve("bye").unwrap().id, PatternId(2));
        assert_eq!(batch.resolve("good bye").unwrap().id, PatternId(2));
        assert!(batch.resolve("bye\n").is_none());
        // Verbose mode stays inside its own member.
        assert_eq!(batch.resolve("see # you").unwrap().id, PatternId(3));
    }

    #[test]
    fn slots_map_back_to_members() {
        let ms = members(&["hi|hello", "(.*) is (.*)", "bye"]);
        let compiled = compile_batches(&ms, &Options::default()).unwrap();
        assert_eq!(compiled.batches.len(), 1);

        let batch = &compiled.batches[0];
        assert_eq!(batch.resolve("hello").unwrap().id, PatternId(1));
        assert_eq!(batch.resolve("BYE").unwrap().id, PatternId(3));

        let hit = batch.resolve("sky is blue").unwrap();
        assert_eq!(hit.id, PatternId(2));
        assert_eq!(hit.groups, vec![Some("sky".to_string()), Some("blue".to_string())]);
    }

    #[test]
    fn members_are_matched_whole() {
        let ms = members(&["a|b"]);
        let compiled = compile_batches(&ms, &Options::default()).unwrap();
        assert!(compiled.batches[0].resolve("ab").is_none());
        assert!(compiled.batches[0].resolve("xb").is_none());
        assert!(compiled.batches[0].resolve("b").is_some());
    }

    #[test]
    fn chunks_respect_batch_size() {
        let ms = members(&["a", "b", "c", "d", "e"]);
        let compiled = compile_batches(&ms, &Options::default().with_batch_size(2)).unwrap();
        let sizes: Vec<usize> = compiled.batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn rejected_batch_falls_back_to_single_members() {
        let ms = members(&["(?P<word>a+)", "(?P<word>b+)"]);
        let compiled = compile_batches(&ms, &Options::default()).unwrap();
        assert_eq!(compiled.batches.len(), 2);
        assert_eq!(compiled.fallback_batches, 2);
        assert_eq!(compiled.batches[1].resolve("bbb").unwrap().groups, vec![Some("bbb".to_string())]);
    }
}
