//! A very simple csv parser that acts only on numbers.
//!
//! ```text
//! csv    = { record } ;
//! record = fields , "\n" ;
//! fields = field , { "," , field } ;
//! field  = digit , { digit } ;
//! digit  = "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" ;
//! ```

use anyhow::Result;
use rdparse::{all, node_with, plus, Parser, Rule};

/// Fragments produced while parsing csv. Each rule reduces to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Csv {
    Digit(String),
    Field(String),
    Fields(Vec<String>),
    Record(Vec<String>),
    Table(Vec<Vec<String>>),
}

impl From<&str> for Csv {
    fn from(s: &str) -> Self {
        Csv::Digit(s.to_owned())
    }
}

/// Rules that may be used as the starting point of a parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsvRule {
    Digit,
    Field,
    Fields,
    Record,
    Csv,
}

pub struct CsvParser {
    digit: Parser<Csv>,
    field: Parser<Csv>,
    fields: Parser<Csv>,
    record: Parser<Csv>,
    csv: Parser<Csv>,
}

fn strings(fragments: Vec<Csv>) -> Vec<String> {
    fragments
        .into_iter()
        .filter_map(|f| match f {
            Csv::Digit(s) | Csv::Field(s) => Some(s),
            _ => None,
        })
        .collect()
}

impl CsvParser {
    pub fn new() -> Result<Self> {
        let digit: Rule<Csv> = Rule::pattern("[0-9]")?;
        let field = node_with(all![&digit, plus(&digit)], |digits: Vec<Csv>| {
            Some(Csv::Field(strings(digits).concat()))
        });
        let fields = node_with(
            all![&field, plus(all![",", &field])],
            |fields: Vec<Csv>| Some(Csv::Fields(strings(fields))),
        );
        let record = node_with(all![&fields, "\n"], |fields: Vec<Csv>| {
            match fields.into_iter().next()? {
                Csv::Fields(fields) => Some(Csv::Record(fields)),
                _ => None,
            }
        });
        let csv = node_with(plus(&record), |records: Vec<Csv>| {
            let records = records.into_iter().filter_map(|r| match r {
                Csv::Record(r) => Some(r),
                _ => None,
            });
            Some(Csv::Table(records.collect()))
        });

        Ok(CsvParser {
            digit: Parser::new(digit),
            field: Parser::new(field),
            fields: Parser::new(fields),
            record: Parser::new(record),
            csv: Parser::new(csv),
        })
    }

    pub fn parse(&self, rule: CsvRule, input: &str) -> Result<Csv> {
        let parser = match rule {
            CsvRule::Digit => &self.digit,
            CsvRule::Field => &self.field,
            CsvRule::Fields => &self.fields,
            CsvRule::Record => &self.record,
            CsvRule::Csv => &self.csv,
        };
        Ok(parser.parse(input)?)
    }
}
