//! Drives plan trees to completion.
//!
//! Root plan nodes (DDL, DML, SELECT, SHOW, transaction control) are
//! dispatched directly; streaming subtrees below them are instantiated as
//! operators and pulled to exhaustion.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, ColumnDef, Index, Table, TableId};
use crate::planner::{OutputColumn, PlanNode};
use crate::sql::{TableRef, TransactionCommand, Value};
use crate::storage::{StorageEngine, TableStore};
use crate::transaction::TransactionManager;

use super::error::{ExecuteError, ExecuteResult};
use super::operators::{build_operator, drain};
use super::result::{QueryResult, ResultSet};

/// Executes plan trees against a catalog, a storage engine and a
/// transaction manager, all passed in explicitly.
pub struct Executor<'a> {
    catalog: &'a mut Catalog,
    engine: &'a dyn StorageEngine,
    tx: &'a mut dyn TransactionManager,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a mut Catalog,
        engine: &'a dyn StorageEngine,
        tx: &'a mut dyn TransactionManager,
    ) -> Self {
        Self {
            catalog,
            engine,
            tx,
        }
    }

    pub fn execute(&mut self, plan: PlanNode) -> ExecuteResult<QueryResult> {
        match plan {
            PlanNode::CreateTable {
                table,
                columns,
                if_not_exists,
            } => self.exec_create_table(table, columns, if_not_exists),

            PlanNode::CreateIndex {
                table,
                index,
                columns,
                if_not_exists,
            } => self.exec_create_index(table, index, columns, if_not_exists),

            PlanNode::DropTable { table, if_exists } => self.exec_drop_table(table, if_exists),

            PlanNode::DropSchema { schema, if_exists } => {
                self.exec_drop_schema(schema, if_exists)
            }

            PlanNode::DropIndex {
                table,
                index,
                if_exists,
            } => self.exec_drop_index(table, index, if_exists),

            PlanNode::Insert { table, values } => self.exec_insert(table, values),

            PlanNode::Update {
                table,
                assignments,
                source,
            } => self.exec_update(table, assignments, *source),

            PlanNode::Delete { table, source } => self.exec_delete(table, *source),

            PlanNode::Select { outputs, source } => self.exec_select(outputs, *source),

            PlanNode::Transaction(cmd) => self.exec_transaction(cmd),

            PlanNode::ShowTables => self.exec_show_tables(),

            PlanNode::ShowColumns { table } => self.exec_show_columns(table),

            other @ (PlanNode::SeqScan { .. }
            | PlanNode::Filter { .. }
            | PlanNode::IndexScan { .. }
            | PlanNode::Sort { .. }
            | PlanNode::Limit { .. }) => {
                Err(ExecuteError::Unsupported(format!("{:?}", other)))
            }
        }
    }

    fn exec_create_table(
        &mut self,
        table: TableRef,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    ) -> ExecuteResult<QueryResult> {
        let store = self.engine.open_table(&columns);
        let created = Table::new(table.schema.clone(), table.name.clone(), columns, store);
        match self.catalog.insert_table(created) {
            Ok(_) => Ok(QueryResult::success(format!("created table {}", table))),
            Err(CatalogError::TableExists(_)) if if_not_exists => {
                Ok(QueryResult::success(format!("table {} already exists", table)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn exec_create_index(
        &mut self,
        table: Arc<Table>,
        index: String,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    ) -> ExecuteResult<QueryResult> {
        if table.index(&index).is_some() {
            return if if_not_exists {
                Ok(QueryResult::success(format!("index {} already exists", index)))
            } else {
                Err(ExecuteError::IndexExists(index))
            };
        }
        table.add_index(Index::new(index.clone(), columns));
        Ok(QueryResult::success(format!(
            "created index {} on {}",
            index,
            table.qualified_name()
        )))
    }

    fn exec_drop_table(
        &mut self,
        table: TableRef,
        if_exists: bool,
    ) -> ExecuteResult<QueryResult> {
        match self.catalog.drop_table(&table.schema, &table.name) {
            Ok(()) => Ok(QueryResult::success(format!("dropped table {}", table))),
            Err(CatalogError::TableNotFound(_)) if if_exists => {
                Ok(QueryResult::success(format!("table {} does not exist", table)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn exec_drop_schema(&mut self, schema: String, if_exists: bool) -> ExecuteResult<QueryResult> {
        match self.catalog.drop_schema(&schema) {
            Ok(count) => Ok(QueryResult::success(format!(
                "dropped schema {} ({} table(s))",
                schema, count
            ))),
            Err(CatalogError::SchemaNotFound(_)) if if_exists => {
                Ok(QueryResult::success(format!("schema {} does not exist", schema)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn exec_drop_index(
        &mut self,
        table: TableRef,
        index: String,
        if_exists: bool,
    ) -> ExecuteResult<QueryResult> {
        match self.catalog.drop_index(&table.schema, &table.name, &index) {
            Ok(()) => Ok(QueryResult::success(format!("dropped index {}", index))),
            Err(CatalogError::TableNotFound(_) | CatalogError::IndexNotFound(_)) if if_exists => {
                Ok(QueryResult::success(format!("index {} does not exist", index)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn exec_insert(&mut self, table: Arc<Table>, values: Vec<Value>) -> ExecuteResult<QueryResult> {
        table.store().write().insert(&values)?;
        Ok(QueryResult::Modified { rows_affected: 1 })
    }

    fn exec_update(
        &mut self,
        table: Arc<Table>,
        assignments: Vec<(usize, Value)>,
        source: PlanNode,
    ) -> ExecuteResult<QueryResult> {
        let mut op = build_operator(&source)?;
        // Materialize before mutating so the scan cursor never observes its
        // own writes.
        let rows = drain(op.as_mut())?;

        let (columns, values): (Vec<usize>, Vec<Value>) = assignments.into_iter().unzip();
        let mut store = table.store().write();
        for row in &rows {
            store.update(row.tuple, &columns, &values)?;
        }
        Ok(QueryResult::Modified {
            rows_affected: rows.len(),
        })
    }

    fn exec_delete(&mut self, table: Arc<Table>, source: PlanNode) -> ExecuteResult<QueryResult> {
        let mut op = build_operator(&source)?;
        let rows = drain(op.as_mut())?;

        let mut store = table.store().write();
        for row in &rows {
            store.delete(row.tuple)?;
        }
        Ok(QueryResult::Modified {
            rows_affected: rows.len(),
        })
    }

    fn exec_select(
        &mut self,
        outputs: Vec<OutputColumn>,
        source: PlanNode,
    ) -> ExecuteResult<QueryResult> {
        let mut op = build_operator(&source)?;
        let rows = drain(op.as_mut())?;

        let mut set = ResultSet::new(outputs.iter().map(|o| o.column.name.clone()).collect());
        for row in rows {
            let projected = outputs
                .iter()
                .map(|o| row.values.get(o.index).cloned().unwrap_or(Value::Null))
                .collect();
            set.rows.push(projected);
        }
        Ok(QueryResult::Rows(set))
    }

    fn exec_transaction(&mut self, cmd: TransactionCommand) -> ExecuteResult<QueryResult> {
        let message = match cmd {
            TransactionCommand::Begin => {
                self.tx.begin();
                "transaction started"
            }
            TransactionCommand::Commit => {
                self.tx.commit();
                "transaction committed"
            }
            TransactionCommand::Rollback => {
                self.tx.rollback();
                "transaction rolled back"
            }
        };
        Ok(QueryResult::success(message))
    }

    fn exec_show_tables(&mut self) -> ExecuteResult<QueryResult> {
        let mut set = ResultSet::new(vec!["table".into()]);
        for table in self.catalog.list_tables() {
            set.rows.push(vec![Value::String(table.qualified_name())]);
        }
        Ok(QueryResult::Rows(set))
    }

    fn exec_show_columns(&mut self, table: TableRef) -> ExecuteResult<QueryResult> {
        let table = self
            .catalog
            .get_table(&table.schema, &table.name)
            .ok_or_else(|| {
                CatalogError::TableNotFound(TableId::new(table.schema.clone(), table.name.clone()))
            })?;

        let mut set = ResultSet::new(vec!["column".into(), "type".into(), "nullable".into()]);
        for column in table.columns() {
            set.rows.push(vec![
                Value::String(column.name.clone()),
                Value::String(column.data_type.sql_name()),
                Value::String(if column.nullable { "YES" } else { "NO" }.into()),
            ]);
        }
        Ok(QueryResult::Rows(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlanBuilder;
    use crate::sql::Parser;
    use crate::storage::MemoryEngine;
    use crate::transaction::LocalTransactionManager;
    use crate::validator::Validator;

    struct Harness {
        catalog: Catalog,
        engine: MemoryEngine,
        tx: LocalTransactionManager,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                catalog: Catalog::new(),
                engine: MemoryEngine,
                tx: LocalTransactionManager::new(),
            }
        }

        fn run(&mut self, sql: &str) -> ExecuteResult<QueryResult> {
            let mut stmt = Parser::parse(sql).unwrap();
            Validator::validate(&mut stmt, &self.catalog).unwrap();
            let plan = PlanBuilder::build(&stmt, &self.catalog).unwrap();
            Executor::new(&mut self.catalog, &self.engine, &mut self.tx).execute(plan)
        }
    }

    fn populated() -> Harness {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.users (id INT, name VARCHAR(5))").unwrap();
        h.run("INSERT INTO db.users VALUES (1, 'a')").unwrap();
        h.run("INSERT INTO db.users VALUES (2, 'b')").unwrap();
        h.run("INSERT INTO db.users VALUES (2, 'c')").unwrap();
        h
    }

    #[test]
    fn test_insert_then_scan_round_trip() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT, name VARCHAR(5))").unwrap();
        let result = h.run("INSERT INTO db.t VALUES (1, 'ab')").unwrap();
        assert_eq!(result, QueryResult::Modified { rows_affected: 1 });

        let result = h.run("SELECT * FROM db.t").unwrap();
        let set = result.rows().unwrap();
        assert_eq!(set.columns, vec!["id", "name"]);
        assert_eq!(
            set.rows,
            vec![vec![Value::Integer(1), Value::String("ab".into())]]
        );
    }

    #[test]
    fn test_select_with_equality_filter() {
        let mut h = populated();
        let result = h.run("SELECT name FROM db.users WHERE id = 2").unwrap();
        let set = result.rows().unwrap();
        assert_eq!(set.columns, vec!["name"]);
        assert_eq!(
            set.rows,
            vec![
                vec![Value::String("b".into())],
                vec![Value::String("c".into())],
            ]
        );
    }

    #[test]
    fn test_update_counts_matching_rows() {
        let mut h = populated();
        let result = h.run("UPDATE db.users SET name = 'z' WHERE id = 2").unwrap();
        assert_eq!(result, QueryResult::Modified { rows_affected: 2 });

        let result = h.run("SELECT name FROM db.users WHERE id = 2").unwrap();
        for row in &result.rows().unwrap().rows {
            assert_eq!(row[0], Value::String("z".into()));
        }
    }

    #[test]
    fn test_delete_with_and_without_filter() {
        let mut h = populated();
        let result = h.run("DELETE FROM db.users WHERE id = 1").unwrap();
        assert_eq!(result, QueryResult::Modified { rows_affected: 1 });

        let result = h.run("DELETE FROM db.users").unwrap();
        assert_eq!(result, QueryResult::Modified { rows_affected: 2 });

        let result = h.run("SELECT * FROM db.users").unwrap();
        assert!(result.rows().unwrap().is_empty());
    }

    #[test]
    fn test_insert_normalized_null_round_trip() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT, name VARCHAR(5))").unwrap();
        h.run("INSERT INTO db.t (name) VALUES ('x')").unwrap();

        let result = h.run("SELECT * FROM db.t").unwrap();
        assert_eq!(
            result.rows().unwrap().rows,
            vec![vec![Value::Null, Value::String("x".into())]]
        );
    }

    #[test]
    fn test_create_table_if_not_exists_is_idempotent() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT, name VARCHAR(5))").unwrap();
        h.run("INSERT INTO db.t VALUES (1, 'a')").unwrap();

        // Second create is a no-op: existing columns and rows survive.
        h.run("CREATE TABLE IF NOT EXISTS db.t (other LONG)").unwrap();
        let result = h.run("SELECT * FROM db.t").unwrap();
        let set = result.rows().unwrap();
        assert_eq!(set.columns, vec!["id", "name"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_drop_table_if_exists_never_fails() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT)").unwrap();
        assert!(h.run("DROP TABLE IF EXISTS db.t").is_ok());
        assert!(h.run("DROP TABLE IF EXISTS db.t").is_ok());
    }

    #[test]
    fn test_drop_schema_removes_all_tables() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.a (id INT)").unwrap();
        h.run("CREATE TABLE db.b (id INT)").unwrap();
        h.run("CREATE TABLE other.c (id INT)").unwrap();

        h.run("DROP SCHEMA db").unwrap();
        let result = h.run("SHOW TABLES").unwrap();
        assert_eq!(
            result.rows().unwrap().rows,
            vec![vec![Value::String("other.c".into())]]
        );
    }

    #[test]
    fn test_index_lifecycle() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT, name VARCHAR(5))").unwrap();
        h.run("CREATE INDEX by_name ON db.t (name)").unwrap();

        // Duplicate tolerated only with IF NOT EXISTS.
        assert!(h.run("CREATE INDEX IF NOT EXISTS by_name ON db.t (name)").is_ok());

        h.run("DROP INDEX db.t.by_name").unwrap();
        assert!(h.run("DROP INDEX IF EXISTS db.t.by_name").is_ok());
    }

    #[test]
    fn test_show_columns_length_qualifies_char_types() {
        let mut h = Harness::new();
        h.run("CREATE TABLE db.t (id INT, tag CHAR(10))").unwrap();

        let result = h.run("SHOW COLUMNS FROM db.t").unwrap();
        let set = result.rows().unwrap();
        assert_eq!(set.rows[0][1], Value::String("INT".into()));
        assert_eq!(set.rows[1][1], Value::String("CHAR(10)".into()));
    }

    #[test]
    fn test_show_columns_unknown_table_fails() {
        let mut h = Harness::new();
        let err = h.run("SHOW COLUMNS FROM db.missing").unwrap_err();
        assert!(matches!(err, ExecuteError::Catalog(CatalogError::TableNotFound(_))));
    }

    #[test]
    fn test_transaction_commands_reach_the_manager() {
        let mut h = Harness::new();
        h.run("BEGIN").unwrap();
        assert!(h.tx.in_transaction());
        h.run("COMMIT").unwrap();
        assert!(!h.tx.in_transaction());
    }

    #[test]
    fn test_tables_with_same_name_in_different_schemas() {
        let mut h = Harness::new();
        h.run("CREATE TABLE a.t (id INT)").unwrap();
        h.run("CREATE TABLE b.t (id INT)").unwrap();
        h.run("INSERT INTO a.t VALUES (1)").unwrap();

        assert_eq!(
            h.run("SELECT * FROM a.t").unwrap().rows().unwrap().len(),
            1
        );
        assert!(h.run("SELECT * FROM b.t").unwrap().rows().unwrap().is_empty());
    }

}
