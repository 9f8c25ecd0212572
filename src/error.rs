use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be parsed as text, or the start offset does not
    /// point into it.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The grammar did not match, or did not consume the whole input.
    // TODO: Carry the furthest `high_pos` reached by any attempt so the
    // message can point at a line and column.
    #[error("unexpected token")]
    Syntax,
    /// The grammar matched but left no fragment on the stack.
    #[error("grammar produced no result")]
    EmptyResult,
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
