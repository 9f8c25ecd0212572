use std::str;

use log::debug;

use crate::error::{Error, Result};
use crate::rule::Rule;
use crate::state::State;
use crate::Fragment;

/// Options for a single parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Byte offset to start parsing at.
    pub start: usize,
    /// Accept a match that does not consume all of the input.
    pub partial: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

/// Drives a grammar over input text.
#[derive(Debug, Clone)]
pub struct Parser<T: Fragment> {
    grammar: Rule<T>,
    /// Ignore matcher every parse starts with.
    noop: Rule<T>,
}

impl<T: Fragment> Parser<T> {
    pub fn new(grammar: impl Into<Rule<T>>) -> Self {
        Parser {
            grammar: grammar.into(),
            noop: Rule::noop(),
        }
    }

    /// Parse all of `input`, returning the fragment left on top of the stack.
    pub fn parse<I>(&self, input: &I) -> Result<T>
    where
        I: AsRef<[u8]> + ?Sized,
    {
        self.parse_with(input, &ParseOptions::default())
    }

    /// Parse `input` according to `options`.
    ///
    /// Input must be valid UTF-8, and the start offset must fall on a
    /// character boundary within it. Otherwise no matching is attempted.
    pub fn parse_with<I>(&self, input: &I, options: &ParseOptions) -> Result<T>
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let text = str::from_utf8(input.as_ref())
            .map_err(|e| Error::InvalidInput(format!("parsing expects text input: {}", e)))?;
        let start = State::with_noop(text, options.start, self.noop.clone())?;
        debug!(
            "parsing {} bytes from {}, partial: {}",
            text.len(),
            options.start,
            options.partial
        );

        let end = match self.grammar.attempt(&start) {
            Some(end) if options.partial || end.is_at_end() => end,
            Some(end) => {
                debug!(
                    "grammar stopped at {} of {}, high pos {:?}",
                    end.idx(),
                    text.len(),
                    end.high_pos()
                );
                return Err(Error::Syntax);
            }
            None => {
                debug!("grammar did not match");
                return Err(Error::Syntax);
            }
        };

        // Only the top fragment is the result. Anything below it is left
        // over from a grammar that does not end in a single node.
        end.top().cloned().ok_or(Error::EmptyResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::{all, inspect, node, node_with, optional, plus};

    fn quoted() -> Parser<String> {
        Parser::new(node(all![
            "\"",
            Rule::pattern("[^\"]*").unwrap(),
            "\""
        ]))
    }

    #[test]
    fn parse_quoted_string() {
        assert_eq!(quoted().parse("\"ab\"").unwrap(), "ab");
        assert_eq!(quoted().parse("\"\"").unwrap(), "");
    }

    #[test]
    fn parse_unterminated_is_syntax_error() {
        assert!(matches!(quoted().parse("\"ab"), Err(Error::Syntax)));
    }

    #[test]
    fn parse_trailing_input() {
        let parser = quoted();
        assert!(matches!(parser.parse("\"ab\"cd"), Err(Error::Syntax)));
        let got = parser
            .parse_with("\"ab\"cd", &ParseOptions::new().partial(true))
            .unwrap();
        assert_eq!(got, "ab");
    }

    #[test]
    fn parse_from_offset() {
        let parser = quoted();
        let got = parser
            .parse_with("xx\"ab\"", &ParseOptions::new().start(2))
            .unwrap();
        assert_eq!(got, "ab");
        assert!(matches!(parser.parse("xx\"ab\""), Err(Error::Syntax)));
    }

    #[test]
    fn parse_rejects_non_text() {
        let tests: Vec<&[u8]> = vec![&[0xff, 0xfe], &[b'"', 0xc3, b'"']];
        for test in tests {
            let got = quoted().parse(test);
            assert!(matches!(got, Err(Error::InvalidInput(_))), "test case: {:?}", test);
        }
        // Even a grammar that cannot produce anything checks its input first.
        let empty: Parser<String> = Parser::new(optional("x"));
        assert!(matches!(empty.parse(&[0x80u8][..]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn parse_rejects_bad_offsets() {
        let parser = quoted();
        let tests = vec![("\"ab\"", 5), ("é", 1)];
        for test in tests {
            let got = parser.parse_with(test.0, &ParseOptions::new().start(test.1));
            assert!(matches!(got, Err(Error::InvalidInput(_))), "test case: {:?}", test);
        }
    }

    #[test]
    fn parse_accepts_bytes() {
        let bytes = b"\"ab\"".to_vec();
        assert_eq!(quoted().parse(&bytes).unwrap(), "ab");
    }

    #[test]
    fn parse_empty_result() {
        let parser: Parser<String> = Parser::new(node_with("a", |_| None));
        assert!(matches!(parser.parse("a"), Err(Error::EmptyResult)));
    }

    #[test]
    fn parse_returns_top_fragment() {
        let parser: Parser<String> = Parser::new(plus(Rule::pattern("[a-z]").unwrap()));
        assert_eq!(parser.parse("abc").unwrap(), "c");
    }

    #[test]
    fn parse_reuses_noop_ignore() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let parser: Parser<String> = Parser::new(inspect("a", move |state| {
            recorded.lock().unwrap().push(state.ignore().clone())
        }));
        assert!(matches!(parser.parse("a"), Err(Error::EmptyResult)));
        assert!(matches!(parser.parse("b"), Err(Error::Syntax)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|ignore| ignore.ptr_eq(&parser.noop)));
    }
}
