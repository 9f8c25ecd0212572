//! Keppel, a small markup language in the style of Jade.
//!
//! ```text
//! keppel     = { tag | free_text }
//! tag        = header [ "[" keppel "]" ]
//! header     = identifier [ attributes ] [ "#" identifier ] { "." identifier }
//! attributes = "(" attribute { "," attribute } ")"
//! attribute  = identifier "=" text
//! free_text  = text
//! text       = "'" ... "'" | '"' ... '"'
//! ```
//!
//! Whitespace and `//` line comments may appear between any two tokens, but
//! not inside quoted text.

use anyhow::{anyhow, Result};
use rdparse::{all, any, ignore_between, node_with, optional, plus, y, Parser, Rule, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Tag(Tag),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub body: Option<Vec<Element>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
enum Ast {
    Text(String),
    Attribute(Attribute),
    Attributes(Vec<Attribute>),
    Id(String),
    Classes(Vec<String>),
    Header(Tag),
    Body(Vec<Element>),
    Element(Element),
    Elements(Vec<Element>),
}

impl From<&str> for Ast {
    fn from(s: &str) -> Self {
        Ast::Text(s.to_owned())
    }
}

fn texts(fragments: Vec<Ast>) -> Vec<String> {
    fragments
        .into_iter()
        .filter_map(|f| match f {
            Ast::Text(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn grammar() -> Result<Rule<Ast>> {
    let identifier: Rule<Ast> = Rule::pattern("[a-zA-Z][a-zA-Z0-9_-]*")?;
    let single = Token::pattern("[^']*")?;
    let double = Token::pattern(r#"[^"]*"#)?;
    let comments = Token::pattern(r"\s|//[^\r\n]*\r?\n")?;

    let keppel = y(|keppel| {
        // Quoted text keeps its whitespace.
        let text = ignore_between(
            "",
            any![all!["'", single, "'"], all!["\"", double, "\""]],
        );

        let attribute = node_with(all![&identifier, "=", &text], |kv: Vec<Ast>| {
            let [name, value] = <[String; 2]>::try_from(texts(kv)).ok()?;
            Some(Ast::Attribute(Attribute { name, value }))
        });
        let attributes = node_with(
            all!["(", &attribute, optional(plus(all![",", &attribute])), ")"],
            |attrs: Vec<Ast>| {
                let attrs = attrs.into_iter().filter_map(|a| match a {
                    Ast::Attribute(a) => Some(a),
                    _ => None,
                });
                Some(Ast::Attributes(attrs.collect()))
            },
        );
        let id = node_with(all!["#", &identifier], |id: Vec<Ast>| {
            texts(id).pop().map(Ast::Id)
        });
        let classes = node_with(plus(all![".", &identifier]), |classes: Vec<Ast>| {
            Some(Ast::Classes(texts(classes)))
        });

        let header = node_with(
            all![
                &identifier,
                optional(attributes),
                optional(id),
                optional(classes)
            ],
            |parts: Vec<Ast>| {
                let mut parts = parts.into_iter();
                let mut tag = match parts.next()? {
                    Ast::Text(name) => Tag {
                        name,
                        ..Tag::default()
                    },
                    _ => return None,
                };
                for part in parts {
                    match part {
                        Ast::Attributes(attrs) => tag.attributes = attrs,
                        Ast::Id(id) => tag.id = Some(id),
                        Ast::Classes(classes) => tag.classes = classes,
                        _ => return None,
                    }
                }
                Some(Ast::Header(tag))
            },
        );
        let body = node_with(all!["[", keppel, "]"], |body: Vec<Ast>| {
            match body.into_iter().next()? {
                Ast::Elements(elements) => Some(Ast::Body(elements)),
                _ => None,
            }
        });
        let tag = node_with(all![header, optional(body)], |parts: Vec<Ast>| {
            let mut parts = parts.into_iter();
            let mut tag = match parts.next()? {
                Ast::Header(tag) => tag,
                _ => return None,
            };
            if let Some(Ast::Body(body)) = parts.next() {
                tag.body = Some(body);
            }
            Some(Ast::Element(Element::Tag(tag)))
        });

        let free_text = node_with(text, |value: Vec<Ast>| {
            texts(value).pop().map(|s| Ast::Element(Element::Text(s)))
        });

        node_with(plus(any![tag, free_text]), |elements: Vec<Ast>| {
            let elements = elements.into_iter().filter_map(|e| match e {
                Ast::Element(e) => Some(e),
                _ => None,
            });
            Some(Ast::Elements(elements.collect()))
        })
    });

    Ok(ignore_between(comments, keppel))
}

pub struct KeppelParser {
    parser: Parser<Ast>,
}

impl KeppelParser {
    pub fn new() -> Result<Self> {
        Ok(KeppelParser {
            parser: Parser::new(grammar()?),
        })
    }

    pub fn parse(&self, input: &str) -> Result<Vec<Element>> {
        match self.parser.parse(input)? {
            Ast::Elements(elements) => Ok(elements),
            other => Err(anyhow!("expected a list of elements, got {:?}", other)),
        }
    }
}
