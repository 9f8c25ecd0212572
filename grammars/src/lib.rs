//! Grammars built on `rdparse`.

pub mod csv;
pub mod dict;
pub mod keppel;

pub use csv::CsvParser;
pub use dict::DictParser;
pub use keppel::KeppelParser;
