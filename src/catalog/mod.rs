//! Catalog module for schema metadata.
//!
//! The catalog is the single source of truth about tables, columns, and
//! indexes. It is passed explicitly to the validator, planner, and executor
//! rather than reached through any global state.

mod manager;
mod table;
mod types;

pub use manager::{Catalog, CatalogError, CatalogResult};
pub use table::{Index, Table, TableId};
pub use types::{ColumnDef, Constraint, DataType};
