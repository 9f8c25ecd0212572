//! Nested dictionaries of strings.
//!
//! ```text
//! dict  = "{" { entry [ "," ] } "}"
//! entry = string ":" ( string | dict )
//! ```
//!
//! Whitespace is allowed around every token inside the braces.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use rdparse::{all, any, ignore, node, node_with, optional, star, y, Parser, Rule, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Dict(BTreeMap<String, Value>),
}

#[derive(Debug, Clone)]
enum Ast {
    Text(String),
    Entry(String, Value),
    Value(Value),
}

impl From<&str> for Ast {
    fn from(s: &str) -> Self {
        Ast::Text(s.to_owned())
    }
}

fn grammar() -> Result<Rule<Ast>> {
    let ws: Rule<Ast> = ignore(Token::pattern(r"\s*")?);
    let chars = Token::pattern(r#"[^"]*"#)?;

    Ok(y(|dict| {
        let string = node(all!["\"", chars, "\""]);
        let value = node_with(any![&string, dict], |value: Vec<Ast>| {
            match value.into_iter().next()? {
                Ast::Text(s) => Some(Ast::Value(Value::Str(s))),
                other => Some(other),
            }
        });
        let entry = node_with(
            all![&string, &ws, ":", &ws, value],
            |kv: Vec<Ast>| match <[Ast; 2]>::try_from(kv).ok()? {
                [Ast::Text(key), Ast::Value(value)] => Some(Ast::Entry(key, value)),
                _ => None,
            },
        );
        node_with(
            all!["{", &ws, star(all![entry, &ws, optional(","), &ws]), "}"],
            |entries: Vec<Ast>| {
                let dict = entries.into_iter().filter_map(|entry| match entry {
                    Ast::Entry(key, value) => Some((key, value)),
                    _ => None,
                });
                Some(Ast::Value(Value::Dict(dict.collect())))
            },
        )
    }))
}

pub struct DictParser {
    parser: Parser<Ast>,
}

impl DictParser {
    pub fn new() -> Result<Self> {
        Ok(DictParser {
            parser: Parser::new(grammar()?),
        })
    }

    pub fn parse(&self, input: &str) -> Result<Value> {
        match self.parser.parse(input)? {
            Ast::Value(value) => Ok(value),
            other => Err(anyhow!("expected a dictionary, got {:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dict() {
        let parser = DictParser::new().unwrap();
        assert_eq!(parser.parse("{}").unwrap(), Value::Dict(BTreeMap::new()));
        assert_eq!(parser.parse("{ \n }").unwrap(), Value::Dict(BTreeMap::new()));
    }

    #[test]
    fn later_keys_win() {
        let parser = DictParser::new().unwrap();
        let got = parser.parse(r#"{"a": "1", "a": "2"}"#).unwrap();
        let want = Value::Dict(BTreeMap::from([("a".to_owned(), Value::Str("2".to_owned()))]));
        assert_eq!(got, want);
    }
}
