//! Narrow per-table storage interface.
//!
//! The physical storage engine is an external collaborator; the planning and
//! execution core only ever talks to it through [`TableStore`]. An in-memory
//! heap implementation ships as the default engine and backs the tests.

mod mem;

use std::fmt;

use thiserror::Error;

pub use mem::{MemTable, MemoryEngine};

use crate::catalog::ColumnDef;
use crate::sql::Value;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failures surfaced to the execution engine.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("tuple arity mismatch: table has {expected} columns, got {actual} values")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("no tuple with id {0}")]
    TupleNotFound(TupleId),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Opaque handle identifying one stored tuple within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleId(pub u64);

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-table storage operations consumed by the execution engine.
///
/// `scan_next` is the cursor primitive behind sequential scans: passing
/// `None` asks for the first tuple, passing a handle asks for the tuple
/// after it. `decode` turns a handle into literal values in column order.
pub trait TableStore: Send + Sync {
    /// Store one tuple. Values are in declared-column order.
    fn insert(&mut self, values: &[Value]) -> StorageResult<()>;

    /// Overwrite the given column positions of an existing tuple.
    fn update(&mut self, tuple: TupleId, columns: &[usize], values: &[Value])
        -> StorageResult<()>;

    /// Remove an existing tuple.
    fn delete(&mut self, tuple: TupleId) -> StorageResult<()>;

    /// The tuple following `prev`, or the first tuple when `prev` is `None`;
    /// `None` when the scan is exhausted.
    fn scan_next(&self, prev: Option<TupleId>) -> Option<TupleId>;

    /// Decode a tuple into literal values matching the table's column order.
    fn decode(&self, tuple: TupleId) -> StorageResult<Vec<Value>>;
}

/// Factory for per-table storage instances, owned by the execution engine
/// and invoked by CREATE TABLE.
pub trait StorageEngine: Send + Sync {
    fn open_table(&self, columns: &[ColumnDef]) -> Box<dyn TableStore>;
}
