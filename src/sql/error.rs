//! Front-end errors.
//!
//! Everything the grammar parser or the conversion layer can reject before
//! a statement reaches semantic validation. Statement shapes the engine
//! could never execute (joins, multi-row inserts, DROP of several objects)
//! are cut off here; shapes the validator owns (clause markers, unknown
//! names) pass through.

use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The grammar parser could not produce a statement at all.
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("statement not supported: {0}")]
    UnsupportedStatement(String),

    #[error("expression not supported: {0}")]
    UnsupportedExpression(String),

    #[error("data type not supported: {0}")]
    UnsupportedDataType(String),

    #[error("bad identifier: {0}")]
    InvalidIdentifier(String),

    #[error("statement is missing its {0}")]
    MissingClause(String),

    #[error("no statement in input")]
    EmptyQuery,

    #[error("expected exactly one statement")]
    MultipleStatements,
}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        ParseError::Syntax(err.to_string())
    }
}
