use crate::error::{Error, Result};
use crate::position::Position;
use crate::rule::Rule;
use crate::stack::Stack;
use crate::Fragment;

/// The outcome of attempting a rule. `None` signals that the rule did not
/// match; it is ordinary control flow, not an error.
pub type StateResult<'a, T> = Option<State<'a, T>>;

/// Parser state.
///
/// States are values: every successful match produces a new state and leaves
/// the one it started from untouched, so a failed alternative can always be
/// retried from its starting state. The fragment stack is persistent and
/// cloning a state shares it.
#[derive(Debug, Clone)]
pub struct State<'a, T: Fragment> {
    text: &'a str,
    idx: usize,
    /// Fragments produced so far, bottom first.
    stack: Stack<T>,
    /// Matcher run before every token to skip insignificant input.
    ignore: Rule<T>,
    /// Furthest position reached while skipping ignorable input.
    high_pos: Position,
}

impl<'a, T: Fragment> State<'a, T> {
    /// Create the starting state for a parse of `text` at `start`, ensuring
    /// that `start` is within bounds and on a character boundary.
    pub fn new(text: &'a str, start: usize) -> Result<Self> {
        State::with_noop(text, start, Rule::noop())
    }

    /// Like [`State::new`], reusing `noop` as the empty ignore matcher.
    pub(crate) fn with_noop(text: &'a str, start: usize, noop: Rule<T>) -> Result<Self> {
        if start > text.len() {
            return Err(Error::InvalidInput(format!(
                "start beyond end of input, start: {}, len: {}",
                start,
                text.len()
            )));
        }
        if !text.is_char_boundary(start) {
            return Err(Error::InvalidInput(format!(
                "start is not on a character boundary, start: {}",
                start
            )));
        }
        Ok(State {
            text,
            idx: start,
            stack: Stack::new(),
            ignore: noop,
            high_pos: Position::START.advance(text, start),
        })
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Input that has not been consumed yet.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.idx..]
    }

    pub fn is_at_end(&self) -> bool {
        self.idx == self.text.len()
    }

    pub fn stack(&self) -> &Stack<T> {
        &self.stack
    }

    pub fn high_pos(&self) -> Position {
        self.high_pos
    }

    pub fn ignore(&self) -> &Rule<T> {
        &self.ignore
    }

    /// Consume `n` bytes of input.
    pub(crate) fn advance(mut self, n: usize) -> Self {
        self.idx += n;
        self
    }

    pub(crate) fn push(mut self, fragment: T) -> Self {
        self.stack.push(fragment);
        self
    }

    /// Remove every fragment above `len`, returning them bottom first.
    pub(crate) fn pop_to(&mut self, len: usize) -> Vec<T> {
        self.stack.pop_to(len)
    }

    /// Restore the stack to a previously seen one, keeping everything else.
    pub(crate) fn with_stack(mut self, stack: Stack<T>) -> Self {
        self.stack = stack;
        self
    }

    pub(crate) fn with_ignore(mut self, ignore: Rule<T>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Extend the high water mark if the current index has moved past it.
    pub(crate) fn mark_high(mut self) -> Self {
        if self.idx > self.high_pos.idx {
            self.high_pos = self.high_pos.advance(self.text, self.idx);
        }
        self
    }

    /// The top fragment, if any.
    pub fn top(&self) -> Option<&T> {
        self.stack.top()
    }
}
