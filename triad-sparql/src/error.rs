//! Error types for query parsing.

/// Error raised while parsing query text.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid command: {0}, must be QUIT/LOAD/SELECT/COUNT")]
    InvalidCommand(String),

    #[error("variables must start with a question mark, got {0}")]
    BadProjectionVariable(String),

    #[error("missing bracket after WHERE")]
    MissingOpenBracket,

    #[error("bad {role} for pattern at index {index} in WHERE clause")]
    BadTerm { role: &'static str, index: usize },

    #[error("bad triple-pattern delimiter: {0:?}")]
    BadDelimiter(char),

    #[error("missing closing bracket in WHERE clause")]
    MissingCloseBracket,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
