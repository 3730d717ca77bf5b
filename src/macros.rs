/// Build a list of `(PatternSet, value)` pairs.
///
/// Each pair is `patterns => value`, where `patterns` is anything that
/// converts into a [`PatternSet`](crate::PatternSet): a string or a list of
/// alternatives.
///
/// ```
/// use colloquy::{Context, phrases};
///
/// let mut ctx = Context::new();
/// ctx.add_chained_phrases(phrases![
///     "knock knock" => "who's there?",
///     ["(.*)", "(.*) who"] => "haha",
/// ])
/// .unwrap();
/// ```
#[macro_export]
macro_rules! phrases {
    ($($patterns:expr => $value:expr),* $(,)?) => {
        vec![ $( ($crate::PatternSet::from($patterns), $value) ),* ]
    };
}
