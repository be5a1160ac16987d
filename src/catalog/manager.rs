//! The catalog: process-wide table metadata, keyed by schema and name.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::table::{Index, Table, TableId};

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog mutation and lookup errors.
///
/// `AlreadyExists` / `NotFound` are downgraded to no-op successes by the
/// executor when the statement carried IF NOT EXISTS / IF EXISTS.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("table already exists: {0}")]
    TableExists(TableId),

    #[error("table not found: {0}")]
    TableNotFound(TableId),

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("index not found: {0}")]
    IndexNotFound(String),
}

/// All schema/table/column/index metadata, mutated only by DDL execution.
///
/// No concurrency control here: a single execution context owns the catalog
/// and passes it down explicitly. Multiple contexts must serialize DDL
/// externally.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: BTreeMap<TableId, Arc<Table>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. Fails if the (schema, name) key is taken.
    pub fn insert_table(&mut self, table: Table) -> CatalogResult<Arc<Table>> {
        let id = table.id().clone();
        if self.tables.contains_key(&id) {
            return Err(CatalogError::TableExists(id));
        }
        let table = Arc::new(table);
        self.tables.insert(id, Arc::clone(&table));
        Ok(table)
    }

    /// Look up a table by its composite key. Empty schema or name never
    /// resolves; there is no implicit cross-schema lookup.
    pub fn get_table(&self, schema: &str, name: &str) -> Option<Arc<Table>> {
        if schema.is_empty() || name.is_empty() {
            return None;
        }
        self.tables
            .get(&TableId::new(schema, name))
            .map(Arc::clone)
    }

    /// Remove a table, releasing its columns, indexes, and storage handle.
    pub fn drop_table(&mut self, schema: &str, name: &str) -> CatalogResult<()> {
        let id = TableId::new(schema, name);
        self.tables
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::TableNotFound(id))
    }

    /// Remove and destroy every table in a schema. Fails if the schema had
    /// no tables at all.
    pub fn drop_schema(&mut self, schema: &str) -> CatalogResult<usize> {
        let before = self.tables.len();
        self.tables.retain(|id, _| id.schema != schema);
        let dropped = before - self.tables.len();
        if dropped == 0 {
            return Err(CatalogError::SchemaNotFound(schema.to_string()));
        }
        Ok(dropped)
    }

    /// Whether any table lives in the given schema.
    pub fn schema_exists(&self, schema: &str) -> bool {
        self.tables.keys().any(|id| id.schema == schema)
    }

    /// Detach an index from a table.
    pub fn drop_index(&mut self, schema: &str, name: &str, index_name: &str) -> CatalogResult<()> {
        let table = self
            .get_table(schema, name)
            .ok_or_else(|| CatalogError::TableNotFound(TableId::new(schema, name)))?;
        if !table.remove_index(index_name) {
            return Err(CatalogError::IndexNotFound(index_name.to_string()));
        }
        Ok(())
    }

    /// Look up an index on a table.
    pub fn get_index(&self, schema: &str, name: &str, index_name: &str) -> Option<Index> {
        self.get_table(schema, name)?.index(index_name)
    }

    /// Snapshot of every registered table, in key order.
    pub fn list_tables(&self) -> Vec<Arc<Table>> {
        self.tables.values().map(Arc::clone).collect()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
