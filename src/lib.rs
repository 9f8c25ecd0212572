//! Parser combinators for recursive descent grammars.
//!
//! A grammar is a [`Rule`] composed out of tokens and combinators. Matching
//! threads an immutable [`State`] through the rules: pattern tokens push the
//! text they match onto the state's fragment stack, and [`node_with`] reduces
//! the fragments produced by a rule into a single AST node. A [`Parser`] runs
//! a grammar over some input and returns the node left on top of the stack.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use rdparse::{all, any, ignore, node, node_with, star, y, Parser, Rule, Token};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Value {
//!     Str(String),
//!     Entry(String, Box<Value>),
//!     Dict(BTreeMap<String, Value>),
//! }
//!
//! impl From<&str> for Value {
//!     fn from(s: &str) -> Self {
//!         Value::Str(s.to_owned())
//!     }
//! }
//!
//! # fn main() -> Result<(), rdparse::Error> {
//! let ws: Rule<Value> = ignore(Token::pattern(r"\s*")?);
//! let chars = Token::pattern(r#"[^"]*"#)?;
//!
//! let dict = y(|dict| {
//!     let string = node(all!["\"", chars, "\""]);
//!     let entry = node_with(
//!         all![&string, &ws, ":", &ws, any![&string, dict]],
//!         |mut kv: Vec<Value>| match (kv.pop(), kv.pop()) {
//!             (Some(value), Some(Value::Str(key))) => Some(Value::Entry(key, Box::new(value))),
//!             _ => None,
//!         },
//!     );
//!     node_with(all!["{", &ws, star(entry), &ws, "}"], |entries: Vec<Value>| {
//!         let dict = entries.into_iter().filter_map(|entry| match entry {
//!             Value::Entry(key, value) => Some((key, *value)),
//!             _ => None,
//!         });
//!         Some(Value::Dict(dict.collect()))
//!     })
//! });
//!
//! let parser = Parser::new(dict);
//! let got = parser.parse(r#"{ "foo": "bar" }"#)?;
//! let want = Value::Dict(BTreeMap::from([("foo".to_owned(), Value::Str("bar".to_owned()))]));
//! assert_eq!(got, want);
//! # Ok(())
//! # }
//! ```

mod combinators;
mod error;
mod parser;
mod position;
mod rule;
mod stack;
mod state;
mod token;

pub use combinators::{
    all, any, debug, ignore, ignore_between, inspect, node, node_with, optional, plus, star, y,
};
pub use error::{Error, Result};
pub use parser::{ParseOptions, Parser};
pub use position::Position;
pub use rule::Rule;
pub use stack::Stack;
pub use state::{State, StateResult};
pub use token::Token;

/// A value that can be held on the fragment stack.
///
/// Pattern tokens push the text they matched, so fragments must be buildable
/// from a string slice.
pub trait Fragment: Clone + for<'a> From<&'a str> {}

impl<T: Clone + for<'a> From<&'a str>> Fragment for T {}
