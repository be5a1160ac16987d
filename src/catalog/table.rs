//! Table and index metadata.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::types::ColumnDef;
use crate::storage::TableStore;

/// Composite catalog key distinguishing tables across schemas.
///
/// Both parts always participate in ordering and equality; `schema.name`
/// is the only valid way to address a table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    pub schema: String,
    pub name: String,
}

impl TableId {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// An index: a name plus the ordered columns it covers.
///
/// Creation is metadata-only; nothing in the execution path consults it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// A table: schema-qualified name, ordered column definitions, attached
/// indexes, and the exclusive handle to its storage-engine instance.
///
/// Column order is semantically significant; it defines the positional
/// tuple layout. The column list is private to this table and never shared
/// with another.
pub struct Table {
    id: TableId,
    columns: Vec<ColumnDef>,
    indexes: RwLock<Vec<Index>>,
    store: RwLock<Box<dyn TableStore>>,
}

impl Table {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        store: Box<dyn TableStore>,
    ) -> Self {
        Self {
            id: TableId::new(schema, name),
            columns,
            indexes: RwLock::new(Vec::new()),
            store: RwLock::new(store),
        }
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn schema(&self) -> &str {
        &self.id.schema
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// `schema.name`, as SHOW TABLES prints it.
    pub fn qualified_name(&self) -> String {
        self.id.to_string()
    }

    /// Ordered column definitions.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Look up a column by name, returning its positional index too.
    pub fn column(&self, name: &str) -> Option<(usize, &ColumnDef)> {
        if name.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// The table's storage handle. Scans take the read lock, mutations the
    /// write lock; no lock is held across pulls.
    pub fn store(&self) -> &RwLock<Box<dyn TableStore>> {
        &self.store
    }

    /// Look up an attached index by name.
    pub fn index(&self, name: &str) -> Option<Index> {
        if name.is_empty() {
            return None;
        }
        self.indexes.read().iter().find(|i| i.name == name).cloned()
    }

    /// Attach an index.
    pub fn add_index(&self, index: Index) {
        self.indexes.write().push(index);
    }

    /// Detach an index by name; false if no such index was attached.
    pub fn remove_index(&self, name: &str) -> bool {
        let mut indexes = self.indexes.write();
        let before = indexes.len();
        indexes.retain(|i| i.name != name);
        indexes.len() != before
    }

    /// Snapshot of the attached indexes.
    pub fn indexes(&self) -> Vec<Index> {
        self.indexes.read().clone()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("columns", &self.columns)
            .field("indexes", &*self.indexes.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::storage::MemTable;

    fn sample_table() -> Table {
        let columns = vec![
            ColumnDef::new("id", DataType::Int),
            ColumnDef::new("name", DataType::Varchar(5)),
        ];
        let store = Box::new(MemTable::new(columns.len()));
        Table::new("db", "users", columns, store)
    }

    #[test]
    fn test_column_lookup_is_positional() {
        let table = sample_table();
        let (idx, col) = table.column("name").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(col.data_type, DataType::Varchar(5));
        assert!(table.column("missing").is_none());
        assert!(table.column("").is_none());
    }

    #[test]
    fn test_index_attach_detach() {
        let table = sample_table();
        assert!(table.index("by_id").is_none());

        let col = table.column("id").unwrap().1.clone();
        table.add_index(Index::new("by_id", vec![col]));
        assert_eq!(table.index("by_id").unwrap().columns.len(), 1);

        assert!(table.remove_index("by_id"));
        assert!(!table.remove_index("by_id"));
    }

    #[test]
    fn test_table_id_distinguishes_schemas() {
        assert_ne!(TableId::new("a", "t"), TableId::new("b", "t"));
        assert_ne!(TableId::new("a", "t"), TableId::new("a", "u"));
        assert_eq!(TableId::new("a", "t"), TableId::new("a", "t"));
    }
}
