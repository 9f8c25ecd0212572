//! Constructors for composite rules.
//!
//! Anything convertible into a [`Rule`] is accepted wherever a rule is
//! expected: string literals become literal tokens and a [`Token`] becomes a
//! token rule. Both run the ambient ignore matcher before matching.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::rule::{Kind, Rule};
use crate::state::State;
use crate::token::Token;
use crate::Fragment;

/// Match each rule in turn, each starting where the previous one ended.
pub fn all<T, I>(rules: I) -> Rule<T>
where
    T: Fragment,
    I: IntoIterator,
    I::Item: Into<Rule<T>>,
{
    Rule::new(Kind::All(rules.into_iter().map(Into::into).collect()))
}

/// Match the first rule that succeeds, trying them in order against the same
/// state.
pub fn any<T, I>(rules: I) -> Rule<T>
where
    T: Fragment,
    I: IntoIterator,
    I::Item: Into<Rule<T>>,
{
    Rule::new(Kind::Any(rules.into_iter().map(Into::into).collect()))
}

/// Match `rule` as many times as possible.
///
/// Despite the name this also succeeds when `rule` does not match at all,
/// which makes it behave exactly like [`star`].
pub fn plus<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    Rule::new(Kind::Plus(rule.into()))
}

/// Match `rule` if possible, otherwise match nothing.
pub fn optional<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    Rule::new(Kind::Optional(rule.into()))
}

/// Zero or more occurrences of `rule`.
pub fn star<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    optional(plus(rule))
}

/// Match `rule`, discarding any fragments it produced.
pub fn ignore<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    Rule::new(Kind::Ignore(rule.into()))
}

/// Match `rule` while skipping any run of `to_ignore` before each of its
/// tokens, and after it.
///
/// Leading input is skipped with the ignore matcher that was active outside
/// of this rule, which is restored once `rule` has matched. An empty literal
/// ignores nothing, which switches off an outer ignore matcher for `rule`.
pub fn ignore_between<T: Fragment>(
    to_ignore: impl Into<Token>,
    rule: impl Into<Rule<T>>,
) -> Rule<T> {
    let token = match to_ignore.into() {
        Token::Literal(lit) if lit.is_empty() => Token::Never,
        token => token,
    };
    Rule::new(Kind::IgnoreBetween {
        ignore: ignore(plus(Rule::raw(token))),
        rule: rule.into(),
    })
}

/// Build a node out of the single fragment produced by `rule`. If `rule`
/// produced several fragments only the first is kept.
pub fn node<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    node_with(rule, |fragments: Vec<T>| fragments.into_iter().next())
}

/// Build a node by reducing the fragments produced by `rule`.
///
/// The fragments are passed to `reduce` in the order they were produced and
/// are replaced by its result. Returning `None` leaves no fragment behind.
pub fn node_with<T, F>(rule: impl Into<Rule<T>>, reduce: F) -> Rule<T>
where
    T: Fragment,
    F: Fn(Vec<T>) -> Option<T> + Send + Sync + 'static,
{
    Rule::new(Kind::Node {
        rule: rule.into(),
        reduce: Arc::new(reduce),
    })
}

/// Define a recursive rule.
///
/// `build` receives a rule standing in for the rule it returns, and may use
/// it anywhere in the definition. Mutually recursive rules are written by
/// nesting calls.
///
/// The stand in only holds a weak reference to the definition. It stops
/// matching once the returned rule and all of its clones are dropped.
pub fn y<T, F>(build: F) -> Rule<T>
where
    T: Fragment,
    F: FnOnce(Rule<T>) -> Rule<T>,
{
    let cell = Arc::new(OnceCell::new());
    let rule = build(Rule::new(Kind::Recurse(Arc::downgrade(&cell))));
    // The cell was created above and cannot have been set yet.
    let _ = cell.set(rule);
    Rule::new(Kind::Fixed(cell))
}

/// Log the state at debug level before every attempt of `rule`.
pub fn debug<T: Fragment>(rule: impl Into<Rule<T>>) -> Rule<T> {
    Rule::new(Kind::Debug {
        rule: rule.into(),
        hook: None,
    })
}

/// Call `hook` with the state before every attempt of `rule`.
pub fn inspect<T, F>(rule: impl Into<Rule<T>>, hook: F) -> Rule<T>
where
    T: Fragment,
    F: for<'a> Fn(&State<'a, T>) + Send + Sync + 'static,
{
    Rule::new(Kind::Debug {
        rule: rule.into(),
        hook: Some(Arc::new(hook)),
    })
}

/// Sequence of rules, converting each argument into a rule.
///
/// ```
/// use rdparse::{all, Rule};
///
/// let greeting: Rule<String> = all!["hello", " ", Rule::pattern("[a-z]+").unwrap()];
/// ```
#[macro_export]
macro_rules! all {
    ($($rule:expr),* $(,)?) => {
        $crate::all(::std::vec![$($crate::Rule::from($rule)),*])
    };
}

/// Ordered choice between rules, converting each argument into a rule.
#[macro_export]
macro_rules! any {
    ($($rule:expr),* $(,)?) => {
        $crate::any(::std::vec![$($crate::Rule::from($rule)),*])
    };
}
