use thiserror::Error;

use crate::catalog::TableId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    #[error("schema '{0}' does not exist")]
    UnknownSchema(String),

    #[error("table '{0}' does not exist")]
    UnknownTable(TableId),

    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { column: String, table: TableId },

    #[error("table '{0}' already exists")]
    TableExists(TableId),

    #[error("index '{0}' already exists")]
    IndexExists(String),

    #[error("index '{index}' does not exist on table '{table}'")]
    UnknownIndex { index: String, table: TableId },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("table has no columns")]
    NoColumns,

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("value for column '{column}' exceeds declared length {limit} (got {actual})")]
    ValueTooLong {
        column: String,
        limit: u32,
        actual: usize,
    },

    #[error("value {value} out of range for INT column '{column}'")]
    IntOutOfRange { column: String, value: i64 },

    #[error("expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

pub type SemanticResult<T> = Result<T, SemanticError>;
