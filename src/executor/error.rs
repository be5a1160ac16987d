//! Execution errors.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Result type for execution operations.
pub type ExecuteResult<T> = Result<T, ExecuteError>;

#[derive(Debug, Clone, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("index '{0}' already exists")]
    IndexExists(String),

    #[error("unsupported plan node: {0}")]
    Unsupported(String),
}
