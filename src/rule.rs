use std::fmt;
use std::sync::{Arc, Weak};

use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::state::{State, StateResult};
use crate::token::Token;
use crate::Fragment;

/// Reduces the fragments collected by a node into at most one fragment.
pub(crate) type Reducer<T> = Arc<dyn Fn(Vec<T>) -> Option<T> + Send + Sync>;

/// Observes a state before a debugged rule runs.
pub(crate) type Hook<T> = Arc<dyn for<'a> Fn(&State<'a, T>) + Send + Sync>;

pub(crate) enum Kind<T: Fragment> {
    /// Matches the empty string. The default ignore matcher.
    Noop,
    /// A token preceded by the ambient ignore matcher.
    Token(Token),
    /// A token on its own, used for the repeated pattern of an ignore
    /// matcher.
    Raw(Token),
    All(Vec<Rule<T>>),
    Any(Vec<Rule<T>>),
    /// Zero or more. Never fails.
    Plus(Rule<T>),
    Optional(Rule<T>),
    Ignore(Rule<T>),
    IgnoreBetween {
        ignore: Rule<T>,
        rule: Rule<T>,
    },
    Node {
        rule: Rule<T>,
        reduce: Reducer<T>,
    },
    /// Owns the definition of a recursive rule.
    Fixed(Arc<OnceCell<Rule<T>>>),
    /// Self reference handed to the definition of a recursive rule.
    Recurse(Weak<OnceCell<Rule<T>>>),
    Debug {
        rule: Rule<T>,
        hook: Option<Hook<T>>,
    },
}

/// A grammar rule.
///
/// Rules are immutable and cheap to clone; clones share the same definition.
/// All parse progress lives in the [`State`] passed to [`Rule::attempt`], so a
/// rule may be used by any number of parses, on any number of threads.
pub struct Rule<T: Fragment>(Arc<Kind<T>>);

impl<T: Fragment> Rule<T> {
    pub(crate) fn new(kind: Kind<T>) -> Self {
        Rule(Arc::new(kind))
    }

    pub(crate) fn noop() -> Self {
        Rule::new(Kind::Noop)
    }

    pub(crate) fn raw(token: Token) -> Self {
        Rule::new(Kind::Raw(token))
    }

    /// A literal token rule.
    pub fn literal(s: impl Into<String>) -> Self {
        Token::literal(s).into()
    }

    /// A pattern token rule, see [`Token::pattern`].
    pub fn pattern(src: &str) -> Result<Self> {
        Ok(Token::pattern(src)?.into())
    }

    /// Whether both handles share one definition.
    #[cfg(test)]
    pub(crate) fn ptr_eq(&self, other: &Rule<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn description(&self) -> &'static str {
        match &*self.0 {
            Kind::Noop => "noop ignore",
            Kind::Token(_) => "token",
            Kind::Raw(_) => "raw token",
            Kind::All(_) => "all",
            Kind::Any(_) => "any",
            Kind::Plus(_) => "plus",
            Kind::Optional(_) => "optional",
            Kind::Ignore(_) => "ignore",
            Kind::IgnoreBetween { .. } => "ignore between",
            Kind::Node { .. } => "node builder",
            Kind::Fixed(_) | Kind::Recurse(_) => "Y",
            Kind::Debug { .. } => "debugged rule",
        }
    }

    /// Attempt to match this rule against `state`, returning the state after
    /// the match. `state` itself is never modified.
    pub fn attempt<'a>(&self, state: &State<'a, T>) -> StateResult<'a, T> {
        match &*self.0 {
            Kind::Noop => Some(state.clone()),
            Kind::Token(token) => {
                // Ignore matchers are usually all optional, and would happily
                // match the empty tail of the input.
                if state.is_at_end() {
                    return None;
                }
                let skipped = state
                    .ignore()
                    .attempt(state)?
                    .with_stack(state.stack().clone())
                    .mark_high();
                match_token(token, skipped)
            }
            Kind::Raw(token) => match_token(token, state.clone()),
            Kind::All(rules) => {
                let mut cur = state.clone();
                for rule in rules {
                    cur = rule.attempt(&cur)?;
                }
                Some(cur)
            }
            // Leftmost is first and best. There is no backtracking into an
            // alternative once it matched.
            Kind::Any(rules) => rules.iter().find_map(|rule| rule.attempt(state)),
            Kind::Plus(rule) => {
                let mut cur = state.clone();
                while let Some(next) = rule.attempt(&cur) {
                    cur = next;
                }
                Some(cur)
            }
            Kind::Optional(rule) => rule.attempt(state).or_else(|| Some(state.clone())),
            Kind::Ignore(rule) => rule
                .attempt(state)
                .map(|next| next.with_stack(state.stack().clone())),
            Kind::IgnoreBetween { ignore, rule } => {
                let outer = state.ignore().clone();
                let leading = outer.attempt(&state.clone().with_ignore(ignore.clone()))?;
                let result = rule.attempt(&leading)?;
                ignore.attempt(&result.with_ignore(outer))
            }
            Kind::Node { rule, reduce } => {
                let size = state.stack().len();
                let mut next = rule.attempt(state)?;
                let fragments = next.pop_to(size);
                match reduce(fragments) {
                    Some(node) => Some(next.push(node)),
                    None => Some(next),
                }
            }
            Kind::Fixed(cell) => cell.get()?.attempt(state),
            Kind::Recurse(cell) => match cell.upgrade() {
                Some(cell) => cell.get()?.attempt(state),
                None => {
                    warn!("recursive rule used after its grammar was dropped");
                    None
                }
            },
            Kind::Debug { rule, hook } => {
                match hook {
                    Some(hook) => hook(state),
                    None => debug!(
                        "{:?} at idx {}, {} fragments, high pos {}:{}, remaining: {:?}",
                        rule,
                        state.idx(),
                        state.stack().len(),
                        state.high_pos().line,
                        state.high_pos().column,
                        preview(state.remaining()),
                    ),
                }
                rule.attempt(state)
            }
        }
    }
}

fn match_token<'a, T: Fragment>(token: &Token, state: State<'a, T>) -> StateResult<'a, T> {
    let (len, matched) = token.match_str(state.remaining())?;
    let state = state.advance(len);
    match matched {
        Some(s) => Some(state.push(T::from(s))),
        None => Some(state),
    }
}

fn preview(s: &str) -> &str {
    match s.char_indices().nth(32) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl<T: Fragment> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Rule(Arc::clone(&self.0))
    }
}

impl<T: Fragment> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.0 {
            Kind::Token(token) | Kind::Raw(token) => write!(f, "{:?}", token),
            Kind::All(rules) | Kind::Any(rules) => {
                f.debug_tuple(self.description()).field(rules).finish()
            }
            Kind::Plus(rule)
            | Kind::Optional(rule)
            | Kind::Ignore(rule)
            | Kind::Node { rule, .. }
            | Kind::Debug { rule, .. } => f.debug_tuple(self.description()).field(rule).finish(),
            Kind::IgnoreBetween { ignore, rule } => f
                .debug_tuple(self.description())
                .field(ignore)
                .field(rule)
                .finish(),
            Kind::Fixed(cell) => match cell.get() {
                Some(rule) => f.debug_tuple(self.description()).field(rule).finish(),
                None => write!(f, "{}", self.description()),
            },
            Kind::Noop | Kind::Recurse(_) => write!(f, "{}", self.description()),
        }
    }
}

/// Tokens used in place of a rule run after the ambient ignore matcher.
impl<T: Fragment> From<Token> for Rule<T> {
    fn from(token: Token) -> Self {
        Rule::new(Kind::Token(token))
    }
}

impl<T: Fragment> From<&str> for Rule<T> {
    fn from(s: &str) -> Self {
        Rule::literal(s)
    }
}

impl<T: Fragment> From<String> for Rule<T> {
    fn from(s: String) -> Self {
        Rule::literal(s)
    }
}

impl<T: Fragment> From<&Rule<T>> for Rule<T> {
    fn from(rule: &Rule<T>) -> Self {
        rule.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all, any, ignore, ignore_between, node, node_with, optional, plus, star, y};

    fn start(text: &str) -> State<String> {
        State::new(text, 0).unwrap()
    }

    fn fragments(state: &State<String>) -> Vec<String> {
        state.stack().to_vec()
    }

    fn word() -> Rule<String> {
        Rule::pattern("[a-z]+").unwrap()
    }

    #[test]
    fn literal_pushes_nothing() {
        let state = Rule::literal("ab").attempt(&start("abc")).unwrap();
        assert_eq!(state.idx(), 2);
        assert!(state.stack().is_empty());
    }

    #[test]
    fn pattern_pushes_match() {
        let state = word().attempt(&start("abc1")).unwrap();
        assert_eq!(state.idx(), 3);
        assert_eq!(fragments(&state), vec!["abc"]);
    }

    #[test]
    fn token_fails_at_end_of_input() {
        let empty = Rule::<String>::pattern("a*").unwrap();
        assert!(empty.attempt(&start("")).is_none());
        assert!(Rule::<String>::literal("").attempt(&start("")).is_none());
    }

    #[test]
    fn all_threads_state() {
        let rule = all![word(), "-", word()];
        let state = rule.attempt(&start("ab-cd!")).unwrap();
        assert_eq!(state.idx(), 5);
        assert_eq!(fragments(&state), vec!["ab", "cd"]);
    }

    #[test]
    fn all_fails_without_partial_progress() {
        let rule = all![word(), "-", word()];
        let input = start("ab-");
        assert!(rule.attempt(&input).is_none());
        assert_eq!(input.idx(), 0);
        assert!(input.stack().is_empty());
    }

    #[test]
    fn any_takes_first_match() {
        let rule: Rule<String> = any!["a", "ab", word()];
        let state = rule.attempt(&start("abc")).unwrap();
        assert_eq!(state.idx(), 1);
        assert!(state.stack().is_empty());

        let state = rule.attempt(&start("xyz")).unwrap();
        assert_eq!(fragments(&state), vec!["xyz"]);
    }

    #[test]
    fn any_does_not_see_failed_pushes() {
        let rule = any![all![word(), "!"], all![word(), "?"]];
        let state = rule.attempt(&start("abc?")).unwrap();
        assert_eq!(fragments(&state), vec!["abc"]);
    }

    #[test]
    fn plus_allows_zero_matches() {
        let rule = plus("a");
        let input = start("bbb");
        let state = rule.attempt(&input).unwrap();
        assert_eq!(state.idx(), 0);

        let state = rule.attempt(&start("aab")).unwrap();
        assert_eq!(state.idx(), 2);
    }

    #[test]
    fn star_matches_like_plus() {
        let tests = vec!["", "b", "ab", "aaab"];
        for test in tests {
            let p = plus("a").attempt(&start(test)).map(|s| s.idx());
            let s = star("a").attempt(&start(test)).map(|s| s.idx());
            assert_eq!(p, s, "test case: {:?}", test);
        }
    }

    #[test]
    fn optional_never_fails() {
        let rule = optional(word());
        assert_eq!(rule.attempt(&start("123")).unwrap().idx(), 0);
        assert_eq!(rule.attempt(&start("ab1")).unwrap().idx(), 2);
    }

    #[test]
    fn ignore_drops_fragments() {
        let rule = all![ignore(word()), "1", word()];
        let state = rule.attempt(&start("ab1cd")).unwrap();
        assert_eq!(state.idx(), 5);
        assert_eq!(fragments(&state), vec!["cd"]);
    }

    #[test]
    fn ignore_between_skips_around_tokens() {
        let rule = ignore_between(" ", all![word(), ",", word()]);
        let state = rule.attempt(&start("  ab ,  cd  ")).unwrap();
        assert!(state.is_at_end());
        assert_eq!(fragments(&state), vec!["ab", "cd"]);
    }

    #[test]
    fn ignore_between_restores_outer_ignore() {
        let rule = all![ignore_between(" ", all!["a", "b"]), "c"];
        let state = rule.attempt(&start("a b c")).unwrap();
        assert_eq!(state.ignore().description(), "noop ignore");
        // The trailing space is consumed by the inner region, so "c" still
        // matches even though the outer region ignores nothing.
        assert!(state.is_at_end());
        assert!(all![ignore_between(" ", "a"), "b"].attempt(&start("a  b")).is_some());
    }

    #[test]
    fn ignore_between_empty_ignores_nothing() {
        let rule: Rule<String> =
            ignore_between(" ", all!["a", ignore_between("", all!["b", "c"])]);
        assert!(rule.attempt(&start("a bc")).is_some());
        assert!(rule.attempt(&start("a b c")).is_none());
    }

    #[test]
    fn ignore_between_tracks_high_pos() {
        let rule: Rule<String> = ignore_between(Token::pattern(r"\s").unwrap(), all!["a", "b"]);
        let state = rule.attempt(&start("a\n\n  b")).unwrap();
        let high = state.high_pos();
        assert_eq!((high.idx, high.line, high.column), (5, 3, 3));
    }

    #[test]
    fn node_reduces_fragments() {
        let rule = node_with(all![word(), ",", word()], |frags: Vec<String>| {
            Some(frags.join("+"))
        });
        let state = all![word(), " ", rule].attempt(&start("x a,b")).unwrap();
        assert_eq!(fragments(&state), vec!["x", "a+b"]);
    }

    #[test]
    fn node_collects_nested_fragments() {
        let inner = node_with(all![word(), "-", word()], |frags: Vec<String>| {
            Some(frags.concat())
        });
        let rule = node_with(all![word(), "(", all![optional(inner), ")"]], |frags: Vec<String>| {
            Some(format!("{:?}", frags))
        });
        let state = rule.attempt(&start("f(a-b)")).unwrap();
        assert_eq!(fragments(&state), vec![r#"["f", "ab"]"#]);
    }

    #[test]
    fn node_returning_none_is_transparent() {
        let rule = node_with(all![word(), word()], |_: Vec<String>| None);
        let state = rule.attempt(&start("ab")).unwrap();
        assert_eq!(state.idx(), 2);
        assert!(state.stack().is_empty());
    }

    #[test]
    fn node_default_keeps_first() {
        let rule = node(all!["\"", Rule::pattern("[^\"]*").unwrap(), "\""]);
        let state = rule.attempt(&start("\"ab\"")).unwrap();
        assert_eq!(fragments(&state), vec!["ab"]);
    }

    #[test]
    fn y_allows_self_reference() {
        // parens = "(" [ parens ] ")"
        let parens: Rule<String> = y(|parens| {
            node_with(all!["(", optional(parens), ")"], |frags: Vec<String>| {
                Some(format!("({})", frags.concat()))
            })
        });
        let state = parens.attempt(&start("((()))")).unwrap();
        assert!(state.is_at_end());
        assert_eq!(fragments(&state), vec!["((()))"]);
        assert!(parens.attempt(&start("(()")).is_none());
    }

    #[test]
    fn y_nested_allows_mutual_reference() {
        // a = "a" [ b ], b = "b" [ a ]
        let a: Rule<String> = y(|a| {
            let b = y(|b| all!["b", optional(all![a.clone(), optional(b)])]);
            all!["a", optional(b)]
        });
        let state = a.attempt(&start("ababa")).unwrap();
        assert!(state.is_at_end());
    }

    #[test]
    fn recurse_fails_after_grammar_dropped() {
        let mut escaped = None;
        let rule: Rule<String> = y(|this| {
            escaped = Some(this.clone());
            optional(this)
        });
        drop(rule);
        let escaped = escaped.unwrap();
        assert!(escaped.attempt(&start("a")).is_none());
    }

    #[test]
    fn debug_formats_structure() {
        let rule: Rule<String> = all!["a", any![word(), plus("b")]];
        assert_eq!(format!("{:?}", rule), r#"all(["a", any([/^(?:[a-z]+)/, plus("b")])])"#);
    }
}
