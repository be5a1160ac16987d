//! In-memory heap storage engine.

use super::{StorageEngine, StorageError, StorageResult, TableStore, TupleId};
use crate::catalog::ColumnDef;
use crate::sql::Value;

/// Slotted in-memory heap. Slots keep their ids for the lifetime of the
/// table, so a deleted tuple's id is never reused and scan order is
/// insertion order. NOT NULL columns, when declared, are enforced on
/// insert and update.
#[derive(Debug, Default)]
pub struct MemTable {
    arity: usize,
    /// Names of the columns that reject NULL, by position.
    required: Vec<Option<String>>,
    slots: Vec<Option<Vec<Value>>>,
}

impl MemTable {
    /// A table of the given width with every column nullable.
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            required: vec![None; arity],
            slots: Vec::new(),
        }
    }

    /// A table shaped by column definitions, remembering which columns
    /// reject NULL.
    pub fn for_columns(columns: &[ColumnDef]) -> Self {
        Self {
            arity: columns.len(),
            required: columns
                .iter()
                .map(|c| (!c.nullable).then(|| c.name.clone()))
                .collect(),
            slots: Vec::new(),
        }
    }

    fn check_not_null(&self, column: usize, value: &Value) -> StorageResult<()> {
        if matches!(value, Value::Null) {
            if let Some(Some(name)) = self.required.get(column) {
                return Err(StorageError::ConstraintViolation(format!(
                    "column '{}' is NOT NULL",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Number of live tuples.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, tuple: TupleId) -> StorageResult<&Vec<Value>> {
        self.slots
            .get(tuple.0 as usize)
            .and_then(|s| s.as_ref())
            .ok_or(StorageError::TupleNotFound(tuple))
    }
}

impl TableStore for MemTable {
    fn insert(&mut self, values: &[Value]) -> StorageResult<()> {
        if values.len() != self.arity {
            return Err(StorageError::ArityMismatch {
                expected: self.arity,
                actual: values.len(),
            });
        }
        for (column, value) in values.iter().enumerate() {
            self.check_not_null(column, value)?;
        }
        self.slots.push(Some(values.to_vec()));
        Ok(())
    }

    fn update(
        &mut self,
        tuple: TupleId,
        columns: &[usize],
        values: &[Value],
    ) -> StorageResult<()> {
        let arity = self.arity;
        for (&column, value) in columns.iter().zip(values) {
            if column >= arity {
                return Err(StorageError::ArityMismatch {
                    expected: arity,
                    actual: column + 1,
                });
            }
            self.check_not_null(column, value)?;
        }
        let slot = self
            .slots
            .get_mut(tuple.0 as usize)
            .and_then(|s| s.as_mut())
            .ok_or(StorageError::TupleNotFound(tuple))?;
        for (&column, value) in columns.iter().zip(values) {
            slot[column] = value.clone();
        }
        Ok(())
    }

    fn delete(&mut self, tuple: TupleId) -> StorageResult<()> {
        let slot = self
            .slots
            .get_mut(tuple.0 as usize)
            .ok_or(StorageError::TupleNotFound(tuple))?;
        if slot.take().is_none() {
            return Err(StorageError::TupleNotFound(tuple));
        }
        Ok(())
    }

    fn scan_next(&self, prev: Option<TupleId>) -> Option<TupleId> {
        let start = match prev {
            None => 0,
            Some(id) => id.0 as usize + 1,
        };
        self.slots
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, s)| s.is_some())
            .map(|(i, _)| TupleId(i as u64))
    }

    fn decode(&self, tuple: TupleId) -> StorageResult<Vec<Value>> {
        self.slot(tuple).cloned()
    }
}

/// Default [`StorageEngine`] handing out [`MemTable`] instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryEngine;

impl StorageEngine for MemoryEngine {
    fn open_table(&self, columns: &[ColumnDef]) -> Box<dyn TableStore> {
        Box::new(MemTable::for_columns(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str) -> Vec<Value> {
        vec![Value::Integer(id), Value::String(name.into())]
    }

    #[test]
    fn test_insert_scan_decode() {
        let mut t = MemTable::new(2);
        t.insert(&row(1, "ab")).unwrap();

        let first = t.scan_next(None).unwrap();
        assert_eq!(t.decode(first).unwrap(), row(1, "ab"));
        assert_eq!(t.scan_next(Some(first)), None);
    }

    #[test]
    fn test_arity_checked_on_insert() {
        let mut t = MemTable::new(2);
        let result = t.insert(&[Value::Integer(1)]);
        assert!(matches!(result, Err(StorageError::ArityMismatch { .. })));
    }

    #[test]
    fn test_scan_skips_deleted_slots() {
        let mut t = MemTable::new(2);
        t.insert(&row(1, "a")).unwrap();
        t.insert(&row(2, "b")).unwrap();
        t.insert(&row(3, "c")).unwrap();

        let second = t.scan_next(t.scan_next(None)).unwrap();
        t.delete(second).unwrap();

        let mut ids = Vec::new();
        let mut cursor = None;
        while let Some(id) = t.scan_next(cursor) {
            ids.push(t.decode(id).unwrap()[0].clone());
            cursor = Some(id);
        }
        assert_eq!(ids, vec![Value::Integer(1), Value::Integer(3)]);
    }

    #[test]
    fn test_update_in_place() {
        let mut t = MemTable::new(2);
        t.insert(&row(1, "a")).unwrap();
        let id = t.scan_next(None).unwrap();

        t.update(id, &[1], &[Value::String("z".into())]).unwrap();
        assert_eq!(t.decode(id).unwrap(), row(1, "z"));
    }

    #[test]
    fn test_not_null_enforced_on_insert_and_update() {
        use crate::catalog::{Constraint, DataType};

        let columns = vec![
            ColumnDef::new("id", DataType::Int).with_constraint(Constraint::NotNull),
            ColumnDef::new("name", DataType::Varchar(5)),
        ];
        let mut t = MemTable::for_columns(&columns);

        let result = t.insert(&[Value::Null, Value::String("a".into())]);
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));

        t.insert(&row(1, "a")).unwrap();
        let id = t.scan_next(None).unwrap();
        let result = t.update(id, &[0], &[Value::Null]);
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));

        // The nullable column still takes NULL.
        t.update(id, &[1], &[Value::Null]).unwrap();
        assert_eq!(t.decode(id).unwrap()[1], Value::Null);
    }

    #[test]
    fn test_delete_twice_fails() {
        let mut t = MemTable::new(1);
        t.insert(&[Value::Integer(1)]).unwrap();
        let id = t.scan_next(None).unwrap();
        t.delete(id).unwrap();
        assert!(matches!(t.delete(id), Err(StorageError::TupleNotFound(_))));
    }
}
