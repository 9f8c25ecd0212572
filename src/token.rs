use std::fmt;

use regex::Regex;

use crate::error::Result;

/// A primitive matcher over the input at the current index.
///
/// Tokens know nothing about ignorable input. Converting a token into a
/// [`Rule`](crate::Rule) wraps it so that the ambient ignore matcher runs
/// before it.
#[derive(Clone)]
pub enum Token {
    /// Matches an exact string. Pushes nothing.
    Literal(String),
    /// Matches a regular expression anchored at the current index. Pushes
    /// the matched text.
    Pattern(Regex),
    /// Never matches.
    Never,
}

impl Token {
    pub fn literal(s: impl Into<String>) -> Self {
        Token::Literal(s.into())
    }

    /// Compile `src` as a pattern anchored to the start of the remaining
    /// input.
    pub fn pattern(src: &str) -> Result<Self> {
        let re = Regex::new(&format!("^(?:{})", src))?;
        Ok(Token::Pattern(re))
    }

    /// Attempt to match against `input`, which is the remaining input.
    /// Returns the number of bytes consumed and, for patterns, the matched
    /// text.
    pub fn match_str<'a>(&self, input: &'a str) -> Option<(usize, Option<&'a str>)> {
        match self {
            Token::Literal(lit) => {
                if input.starts_with(lit.as_str()) {
                    Some((lit.len(), None))
                } else {
                    None
                }
            }
            Token::Pattern(re) => re.find(input).map(|m| (m.end(), Some(m.as_str()))),
            Token::Never => None,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Literal(lit) => write!(f, "{:?}", lit),
            Token::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Token::Never => write!(f, "<never>"),
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::literal(s)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::Literal(s)
    }
}
