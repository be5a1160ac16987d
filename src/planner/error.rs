//! Planning errors.

use thiserror::Error;

use crate::catalog::TableId;

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Plan construction errors.
///
/// Statements reach the builder already validated, so these only fire when
/// the catalog changed between validation and planning, or when a statement
/// shape slipped past validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}
