//! Lowers validated statements into physical plan trees.

use std::sync::Arc;

use crate::catalog::{Catalog, Table, TableId};
use crate::sql::ast::{BinaryOperator, Expr, Statement};
use crate::sql::TableRef;

use super::error::{PlanError, PlanResult};
use super::plan::{OutputColumn, PlanNode};

/// Builds a plan tree from a statement that already passed validation.
pub struct PlanBuilder;

impl PlanBuilder {
    pub fn build(stmt: &Statement, catalog: &Catalog) -> PlanResult<PlanNode> {
        match stmt {
            Statement::CreateTable(create) => Ok(PlanNode::CreateTable {
                table: create.table.clone(),
                columns: create.columns.clone(),
                if_not_exists: create.if_not_exists,
            }),

            Statement::CreateIndex(create) => {
                let table = Self::resolve_table(&create.table, catalog)?;
                let columns = create
                    .columns
                    .iter()
                    .map(|name| {
                        table
                            .column(name)
                            .map(|(_, def)| def.clone())
                            .ok_or_else(|| PlanError::ColumnNotFound(name.clone()))
                    })
                    .collect::<PlanResult<Vec<_>>>()?;
                Ok(PlanNode::CreateIndex {
                    table,
                    index: create.index.clone(),
                    columns,
                    if_not_exists: create.if_not_exists,
                })
            }

            Statement::DropTable(drop) => Ok(PlanNode::DropTable {
                table: drop.table.clone(),
                if_exists: drop.if_exists,
            }),

            Statement::DropSchema(drop) => Ok(PlanNode::DropSchema {
                schema: drop.schema.clone(),
                if_exists: drop.if_exists,
            }),

            Statement::DropIndex(drop) => Ok(PlanNode::DropIndex {
                table: drop.table.clone(),
                index: drop.index.clone(),
                if_exists: drop.if_exists,
            }),

            Statement::Insert(insert) => {
                let table = Self::resolve_table(&insert.table, catalog)?;
                let values = insert
                    .values
                    .iter()
                    .map(Self::literal)
                    .collect::<PlanResult<Vec<_>>>()?;
                Ok(PlanNode::Insert { table, values })
            }

            Statement::Update(update) => {
                let table = Self::resolve_table(&update.table, catalog)?;
                let source = Self::build_source(&table, update.where_clause.as_ref())?;
                let assignments = update
                    .assignments
                    .iter()
                    .map(|a| {
                        let (index, _) = table
                            .column(&a.column)
                            .ok_or_else(|| PlanError::ColumnNotFound(a.column.clone()))?;
                        Ok((index, Self::literal(&a.value)?))
                    })
                    .collect::<PlanResult<Vec<_>>>()?;
                Ok(PlanNode::Update {
                    table,
                    assignments,
                    source: Box::new(source),
                })
            }

            Statement::Delete(delete) => {
                let table = Self::resolve_table(&delete.table, catalog)?;
                let source = Self::build_source(&table, delete.where_clause.as_ref())?;
                Ok(PlanNode::Delete {
                    table,
                    source: Box::new(source),
                })
            }

            Statement::Select(select) => {
                let table = Self::resolve_table(&select.table, catalog)?;
                let source = Self::build_source(&table, select.where_clause.as_ref())?;
                let outputs = Self::resolve_projection(&select.projection, &table)?;
                Ok(PlanNode::Select {
                    outputs,
                    source: Box::new(source),
                })
            }

            Statement::Transaction(cmd) => Ok(PlanNode::Transaction(cmd.clone())),

            Statement::Show(show) => match (&show.kind, &show.table) {
                (crate::sql::ShowKind::Tables, _) => Ok(PlanNode::ShowTables),
                (crate::sql::ShowKind::Columns, Some(table)) => Ok(PlanNode::ShowColumns {
                    table: table.clone(),
                }),
                (crate::sql::ShowKind::Columns, None) => Err(PlanError::Unsupported(
                    "SHOW COLUMNS requires a table".into(),
                )),
            },
        }
    }

    /// Scan the table, optionally wrapped in one equality filter.
    fn build_source(table: &Arc<Table>, where_clause: Option<&Expr>) -> PlanResult<PlanNode> {
        let scan = PlanNode::SeqScan {
            table: Arc::clone(table),
        };
        match where_clause {
            None => Ok(scan),
            Some(expr) => {
                let (column, value) = Self::extract_filter(expr, table)?;
                Ok(PlanNode::Filter {
                    column,
                    value,
                    source: Box::new(scan),
                })
            }
        }
    }

    /// The one supported predicate shape: `column = literal` (either side).
    /// The column resolves to its positional index in the scanned tuple.
    fn extract_filter(expr: &Expr, table: &Table) -> PlanResult<(usize, crate::sql::Value)> {
        let (left, op, right) = match expr {
            Expr::BinaryOp {
                left: Some(l),
                op,
                right: Some(r),
            } => (l.as_ref(), op, r.as_ref()),
            other => {
                return Err(PlanError::Unsupported(format!(
                    "filter expression: {:?}",
                    other
                )))
            }
        };
        if *op != BinaryOperator::Eq {
            return Err(PlanError::Unsupported(format!("filter operator: {:?}", op)));
        }

        let (name, literal) = match (left, right) {
            (Expr::Column(name), Expr::Literal(v)) => (name, v),
            (Expr::Literal(v), Expr::Column(name)) => (name, v),
            _ => {
                return Err(PlanError::Unsupported(
                    "filter requires one column and one literal".into(),
                ))
            }
        };
        let (index, _) = table
            .column(name)
            .ok_or_else(|| PlanError::ColumnNotFound(name.clone()))?;
        Ok((index, literal.clone()))
    }

    /// Star expands to every column in declared order; named columns keep
    /// select-list order.
    fn resolve_projection(projection: &[Expr], table: &Table) -> PlanResult<Vec<OutputColumn>> {
        let mut outputs = Vec::new();
        for expr in projection {
            match expr {
                Expr::Star => {
                    for (index, column) in table.columns().iter().enumerate() {
                        outputs.push(OutputColumn {
                            column: column.clone(),
                            index,
                        });
                    }
                }
                Expr::Column(name) => {
                    let (index, column) = table
                        .column(name)
                        .ok_or_else(|| PlanError::ColumnNotFound(name.clone()))?;
                    outputs.push(OutputColumn {
                        column: column.clone(),
                        index,
                    });
                }
                other => {
                    return Err(PlanError::Unsupported(format!(
                        "projection expression: {:?}",
                        other
                    )))
                }
            }
        }
        Ok(outputs)
    }

    fn literal(expr: &Expr) -> PlanResult<crate::sql::Value> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            other => Err(PlanError::Unsupported(format!(
                "expected literal value, got {:?}",
                other
            ))),
        }
    }

    fn resolve_table(table: &TableRef, catalog: &Catalog) -> PlanResult<Arc<Table>> {
        catalog.get_table(&table.schema, &table.name).ok_or_else(|| {
            PlanError::TableNotFound(TableId::new(table.schema.clone(), table.name.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, DataType, Table};
    use crate::sql::{Parser, Value};
    use crate::storage::MemTable;
    use crate::validator::Validator;

    fn setup() -> Catalog {
        let mut catalog = Catalog::new();
        let columns = vec![
            ColumnDef::new("id", DataType::Int),
            ColumnDef::new("name", DataType::Varchar(5)),
        ];
        let store = Box::new(MemTable::new(columns.len()));
        catalog
            .insert_table(Table::new("db", "users", columns, store))
            .unwrap();
        catalog
    }

    fn plan(sql: &str, catalog: &Catalog) -> PlanResult<PlanNode> {
        let mut stmt = Parser::parse(sql).unwrap();
        Validator::validate(&mut stmt, catalog).unwrap();
        PlanBuilder::build(&stmt, catalog)
    }

    #[test]
    fn test_select_star_plan_shape() {
        let catalog = setup();
        let node = plan("SELECT * FROM db.users", &catalog).unwrap();
        let (outputs, source) = match node {
            PlanNode::Select { outputs, source } => (outputs, source),
            other => panic!("unexpected plan: {:?}", other),
        };
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].column.name, "id");
        assert_eq!(outputs[0].index, 0);
        assert_eq!(outputs[1].column.name, "name");
        assert_eq!(outputs[1].index, 1);
        assert!(matches!(*source, PlanNode::SeqScan { .. }));
    }

    #[test]
    fn test_where_builds_filter_over_scan() {
        let catalog = setup();
        let node = plan("SELECT name FROM db.users WHERE id = 2", &catalog).unwrap();
        let source = match node {
            PlanNode::Select { ref source, .. } => source,
            ref other => panic!("unexpected plan: {:?}", other),
        };
        match source.as_ref() {
            PlanNode::Filter {
                column,
                value,
                source,
            } => {
                assert_eq!(*column, 0);
                assert_eq!(*value, Value::Integer(2));
                assert!(matches!(source.as_ref(), PlanNode::SeqScan { .. }));
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_filter_column_on_right_side() {
        let catalog = setup();
        let node = plan("SELECT id FROM db.users WHERE 2 = id", &catalog).unwrap();
        let source = match node {
            PlanNode::Select { source, .. } => source,
            other => panic!("unexpected plan: {:?}", other),
        };
        assert!(matches!(
            *source,
            PlanNode::Filter { column: 0, value: Value::Integer(2), .. }
        ));
    }

    #[test]
    fn test_non_equality_filter_rejected() {
        let catalog = setup();
        let err = plan("SELECT id FROM db.users WHERE id < 2", &catalog).unwrap_err();
        assert!(matches!(err, PlanError::Unsupported(_)));
    }

    #[test]
    fn test_update_resolves_assignment_indices() {
        let catalog = setup();
        let node = plan("UPDATE db.users SET name = 'y' WHERE id = 1", &catalog).unwrap();
        let (assignments, source) = match node {
            PlanNode::Update {
                assignments,
                source,
                ..
            } => (assignments, source),
            other => panic!("unexpected plan: {:?}", other),
        };
        assert_eq!(assignments, vec![(1, Value::String("y".into()))]);
        assert!(matches!(*source, PlanNode::Filter { .. }));
    }

    #[test]
    fn test_delete_without_where_scans_directly() {
        let catalog = setup();
        let node = plan("DELETE FROM db.users", &catalog).unwrap();
        let source = match node {
            PlanNode::Delete { source, .. } => source,
            other => panic!("unexpected plan: {:?}", other),
        };
        assert!(matches!(*source, PlanNode::SeqScan { .. }));
    }

    #[test]
    fn test_insert_carries_normalized_values() {
        let catalog = setup();
        let node = plan("INSERT INTO db.users (name) VALUES ('x')", &catalog).unwrap();
        let values = match node {
            PlanNode::Insert { values, .. } => values,
            other => panic!("unexpected plan: {:?}", other),
        };
        assert_eq!(values, vec![Value::Null, Value::String("x".into())]);
    }

    #[test]
    fn test_create_index_resolves_columns() {
        let catalog = setup();
        let node = plan("CREATE INDEX by_name ON db.users (name)", &catalog).unwrap();
        let columns = match node {
            PlanNode::CreateIndex { columns, .. } => columns,
            other => panic!("unexpected plan: {:?}", other),
        };
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "name");
    }

    #[test]
    fn test_table_dropped_between_validation_and_planning() {
        let catalog = setup();
        let mut stmt = Parser::parse("SELECT * FROM db.users").unwrap();
        Validator::validate(&mut stmt, &catalog).unwrap();

        let mut emptied = catalog;
        emptied.drop_table("db", "users").unwrap();
        let err = PlanBuilder::build(&stmt, &emptied).unwrap_err();
        assert!(matches!(err, PlanError::TableNotFound(_)));
    }
}
