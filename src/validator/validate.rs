//! Semantic validation of statements against the catalog.
//!
//! Runs after parsing and before planning. Besides checking names and value
//! types, INSERT validation rewrites the value list into declared-column
//! order, which is why statements are taken by mutable reference.

use std::sync::Arc;

use crate::catalog::{Catalog, DataType, Table, TableId};
use crate::sql::ast::{
    CreateIndex, CreateTable, Delete, DropIndex, DropSchema, DropTable, Expr, Insert, Select,
    Statement, TableRef, Update, Value,
};

use super::error::{SemanticError, SemanticResult};

pub struct Validator;

impl Validator {
    pub fn validate(stmt: &mut Statement, catalog: &Catalog) -> SemanticResult<()> {
        match stmt {
            Statement::CreateTable(create) => Self::validate_create_table(create, catalog),
            Statement::CreateIndex(create) => Self::validate_create_index(create, catalog),
            Statement::DropTable(drop) => Self::validate_drop_table(drop, catalog),
            Statement::DropSchema(drop) => Self::validate_drop_schema(drop, catalog),
            Statement::DropIndex(drop) => Self::validate_drop_index(drop, catalog),
            Statement::Select(select) => Self::validate_select(select, catalog),
            Statement::Insert(insert) => Self::validate_insert(insert, catalog),
            Statement::Update(update) => Self::validate_update(update, catalog),
            Statement::Delete(delete) => Self::validate_delete(delete, catalog),
            // No catalog-dependent checks; missing SHOW targets surface at
            // execution time.
            Statement::Transaction(_) | Statement::Show(_) => Ok(()),
        }
    }

    fn validate_create_table(create: &CreateTable, catalog: &Catalog) -> SemanticResult<()> {
        if create.table.schema.is_empty() || create.table.name.is_empty() {
            return Err(SemanticError::InvalidName(
                "CREATE TABLE requires a schema-qualified name".into(),
            ));
        }
        if create.columns.is_empty() {
            return Err(SemanticError::NoColumns);
        }
        for (i, col) in create.columns.iter().enumerate() {
            if col.name.is_empty() {
                return Err(SemanticError::InvalidName("empty column name".into()));
            }
            if create.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SemanticError::DuplicateColumn(col.name.clone()));
            }
            if !col.data_type.is_supported() {
                return Err(SemanticError::Unsupported(format!(
                    "data type {} for column '{}'",
                    col.data_type, col.name
                )));
            }
        }
        if !create.if_not_exists
            && catalog
                .get_table(&create.table.schema, &create.table.name)
                .is_some()
        {
            return Err(SemanticError::TableExists(Self::table_id(&create.table)));
        }
        Ok(())
    }

    fn validate_create_index(create: &CreateIndex, catalog: &Catalog) -> SemanticResult<()> {
        let table = Self::resolve_table(&create.table, catalog)?;
        for col in &create.columns {
            if table.column(col).is_none() {
                return Err(SemanticError::UnknownColumn {
                    column: col.clone(),
                    table: table.id().clone(),
                });
            }
        }
        if !create.if_not_exists && table.index(&create.index).is_some() {
            return Err(SemanticError::IndexExists(create.index.clone()));
        }
        Ok(())
    }

    fn validate_drop_table(drop: &DropTable, catalog: &Catalog) -> SemanticResult<()> {
        if !drop.if_exists
            && catalog
                .get_table(&drop.table.schema, &drop.table.name)
                .is_none()
        {
            return Err(SemanticError::UnknownTable(Self::table_id(&drop.table)));
        }
        Ok(())
    }

    fn validate_drop_schema(drop: &DropSchema, catalog: &Catalog) -> SemanticResult<()> {
        if !drop.if_exists && !catalog.schema_exists(&drop.schema) {
            return Err(SemanticError::UnknownSchema(drop.schema.clone()));
        }
        Ok(())
    }

    fn validate_drop_index(drop: &DropIndex, catalog: &Catalog) -> SemanticResult<()> {
        if drop.if_exists {
            return Ok(());
        }
        let table = Self::resolve_table(&drop.table, catalog)?;
        if table.index(&drop.index).is_none() {
            return Err(SemanticError::UnknownIndex {
                index: drop.index.clone(),
                table: table.id().clone(),
            });
        }
        Ok(())
    }

    fn validate_select(select: &Select, catalog: &Catalog) -> SemanticResult<()> {
        if select.set_operation {
            return Err(SemanticError::Unsupported("set operations".into()));
        }
        if select.with_clause {
            return Err(SemanticError::Unsupported("WITH clauses".into()));
        }
        if select.locking {
            return Err(SemanticError::Unsupported("locking clauses".into()));
        }
        if !select.group_by.is_empty() {
            return Err(SemanticError::Unsupported("GROUP BY".into()));
        }

        let table = Self::resolve_table(&select.table, catalog)?;

        for expr in &select.projection {
            Self::validate_expr(expr, &table, catalog)?;
        }
        if let Some(expr) = &select.where_clause {
            Self::validate_expr(expr, &table, catalog)?;
        }
        for spec in &select.order_by {
            Self::validate_expr(&spec.expr, &table, catalog)?;
        }
        if let Some(expr) = &select.limit {
            Self::validate_expr(expr, &table, catalog)?;
        }
        if let Some(expr) = &select.offset {
            Self::validate_expr(expr, &table, catalog)?;
        }
        Ok(())
    }

    fn validate_insert(insert: &mut Insert, catalog: &Catalog) -> SemanticResult<()> {
        if insert.from_select {
            return Err(SemanticError::Unsupported("INSERT ... SELECT".into()));
        }
        let table = Self::resolve_table(&insert.table, catalog)?;

        if let Some(columns) = &insert.columns {
            if columns.len() != insert.values.len() {
                return Err(SemanticError::ArityMismatch {
                    expected: columns.len(),
                    actual: insert.values.len(),
                });
            }
            for (i, col) in columns.iter().enumerate() {
                if table.column(col).is_none() {
                    return Err(SemanticError::UnknownColumn {
                        column: col.clone(),
                        table: table.id().clone(),
                    });
                }
                // A repeated target would silently drop its later value
                // during normalization.
                if columns[..i].contains(col) {
                    return Err(SemanticError::DuplicateColumn(col.clone()));
                }
            }
        } else if insert.values.len() > table.columns().len() {
            return Err(SemanticError::ArityMismatch {
                expected: table.columns().len(),
                actual: insert.values.len(),
            });
        }

        let normalized = Self::normalize_values(insert, &table);

        for (col, expr) in table.columns().iter().zip(&normalized) {
            let value = match expr {
                Expr::Literal(v) => v,
                other => {
                    return Err(SemanticError::Unsupported(format!(
                        "non-literal INSERT value for column '{}': {:?}",
                        col.name, other
                    )))
                }
            };
            Self::check_value(&col.name, col.data_type, value)?;
        }

        insert.values = normalized;
        insert.columns = None;
        Ok(())
    }

    /// Rewrites the supplied values into declared-column order, substituting
    /// NULL for every omitted column.
    fn normalize_values(insert: &Insert, table: &Table) -> Vec<Expr> {
        match &insert.columns {
            Some(columns) => table
                .columns()
                .iter()
                .map(|col| {
                    columns
                        .iter()
                        .position(|c| c == &col.name)
                        .and_then(|i| insert.values.get(i).cloned())
                        .unwrap_or_else(Expr::null)
                })
                .collect(),
            None => (0..table.columns().len())
                .map(|i| insert.values.get(i).cloned().unwrap_or_else(Expr::null))
                .collect(),
        }
    }

    fn check_value(column: &str, declared: DataType, value: &Value) -> SemanticResult<()> {
        match (declared, value) {
            (_, Value::Null) => Ok(()),

            (DataType::Int, Value::Integer(i)) => {
                if *i < i64::from(i32::MIN) || *i > i64::from(i32::MAX) {
                    Err(SemanticError::IntOutOfRange {
                        column: column.to_string(),
                        value: *i,
                    })
                } else {
                    Ok(())
                }
            }
            (DataType::Long, Value::Integer(_)) => Ok(()),

            (DataType::Char(limit), Value::String(s))
            | (DataType::Varchar(limit), Value::String(s)) => {
                if s.len() > limit as usize {
                    Err(SemanticError::ValueTooLong {
                        column: column.to_string(),
                        limit,
                        actual: s.len(),
                    })
                } else {
                    Ok(())
                }
            }

            (DataType::Float | DataType::Boolean | DataType::Date, _) => {
                Err(SemanticError::Unsupported(format!(
                    "data type {} for column '{}'",
                    declared, column
                )))
            }

            (_, found) => Err(SemanticError::TypeMismatch {
                column: column.to_string(),
                expected: declared.to_string(),
                found: found.type_name().to_string(),
            }),
        }
    }

    fn validate_update(update: &Update, catalog: &Catalog) -> SemanticResult<()> {
        let table = Self::resolve_table(&update.table, catalog)?;
        for assignment in &update.assignments {
            if table.column(&assignment.column).is_none() {
                return Err(SemanticError::UnknownColumn {
                    column: assignment.column.clone(),
                    table: table.id().clone(),
                });
            }
            Self::validate_expr(&assignment.value, &table, catalog)?;
        }
        if let Some(expr) = &update.where_clause {
            Self::validate_expr(expr, &table, catalog)?;
        }
        Ok(())
    }

    fn validate_delete(delete: &Delete, catalog: &Catalog) -> SemanticResult<()> {
        let table = Self::resolve_table(&delete.table, catalog)?;
        if let Some(expr) = &delete.where_clause {
            Self::validate_expr(expr, &table, catalog)?;
        }
        Ok(())
    }

    /// Recursive descent over expression shapes, shared by SELECT, UPDATE and
    /// DELETE validation.
    fn validate_expr(expr: &Expr, table: &Arc<Table>, catalog: &Catalog) -> SemanticResult<()> {
        match expr {
            Expr::Literal(Value::Null)
            | Expr::Literal(Value::Integer(_))
            | Expr::Literal(Value::String(_)) => Ok(()),

            Expr::Literal(other) => Err(SemanticError::Unsupported(format!(
                "{} literal",
                other.type_name()
            ))),

            Expr::Star => Ok(()),

            Expr::Column(name) => {
                if table.column(name).is_none() {
                    return Err(SemanticError::UnknownColumn {
                        column: name.clone(),
                        table: table.id().clone(),
                    });
                }
                Ok(())
            }

            // Partial forms with an absent operand are allowed.
            Expr::BinaryOp { left, right, .. } => {
                if let Some(l) = left {
                    Self::validate_expr(l, table, catalog)?;
                }
                if let Some(r) = right {
                    Self::validate_expr(r, table, catalog)?;
                }
                Ok(())
            }

            Expr::Subquery(select) => Self::validate_select(select, catalog),

            Expr::Function { name, .. } => {
                Err(SemanticError::Unsupported(format!("function {}()", name)))
            }
        }
    }

    fn resolve_table(table: &TableRef, catalog: &Catalog) -> SemanticResult<Arc<Table>> {
        catalog
            .get_table(&table.schema, &table.name)
            .ok_or_else(|| SemanticError::UnknownTable(Self::table_id(table)))
    }

    fn table_id(table: &TableRef) -> TableId {
        TableId::new(table.schema.clone(), table.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, Constraint, DataType, Table};
    use crate::sql::Parser;
    use crate::storage::MemTable;

    fn setup() -> Catalog {
        let mut catalog = Catalog::new();
        let columns = vec![
            ColumnDef::new("id", DataType::Int).with_constraint(Constraint::NotNull),
            ColumnDef::new("name", DataType::Varchar(5)),
        ];
        let store = Box::new(MemTable::new(columns.len()));
        let table = Table::new("db", "users", columns, store);
        catalog.insert_table(table).unwrap();
        catalog
    }

    fn validated(sql: &str, catalog: &Catalog) -> SemanticResult<Statement> {
        let mut stmt = Parser::parse(sql).unwrap();
        Validator::validate(&mut stmt, catalog)?;
        Ok(stmt)
    }

    #[test]
    fn test_select_unknown_table_rejected() {
        let catalog = setup();
        let err = validated("SELECT * FROM db.missing", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownTable(_)));
    }

    #[test]
    fn test_select_unknown_column_rejected() {
        let catalog = setup();
        let err = validated("SELECT age FROM db.users", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownColumn { .. }));
    }

    #[test]
    fn test_select_group_by_rejected() {
        let catalog = setup();
        let err = validated("SELECT id FROM db.users GROUP BY id", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::Unsupported(_)));
    }

    #[test]
    fn test_select_set_operation_rejected() {
        let catalog = setup();
        let err = validated(
            "SELECT id FROM db.users UNION SELECT id FROM db.users",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::Unsupported(_)));
    }

    #[test]
    fn test_unqualified_table_rejected() {
        let catalog = setup();
        let err = validated("SELECT * FROM users", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownTable(_)));
    }

    #[test]
    fn test_insert_normalizes_named_columns() {
        let catalog = setup();
        let stmt =
            validated("INSERT INTO db.users (name) VALUES ('x')", &catalog).unwrap();
        let insert = match stmt {
            Statement::Insert(i) => i,
            other => panic!("unexpected statement: {:?}", other),
        };
        assert_eq!(insert.values, vec![Expr::null(), Expr::string("x")]);
        assert!(insert.columns.is_none());
    }

    #[test]
    fn test_insert_pads_positional_values() {
        let catalog = setup();
        let stmt = validated("INSERT INTO db.users VALUES (7)", &catalog).unwrap();
        let insert = match stmt {
            Statement::Insert(i) => i,
            other => panic!("unexpected statement: {:?}", other),
        };
        assert_eq!(insert.values, vec![Expr::integer(7), Expr::null()]);
    }

    #[test]
    fn test_insert_duplicate_target_column_rejected() {
        let catalog = setup();
        let err = validated(
            "INSERT INTO db.users (name, name) VALUES ('a', 'b')",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateColumn(_)));
    }

    #[test]
    fn test_insert_string_too_long_rejected() {
        let catalog = setup();
        let err = validated("INSERT INTO db.users VALUES (1, 'abcdef')", &catalog).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ValueTooLong { limit: 5, actual: 6, .. }
        ));
    }

    #[test]
    fn test_insert_type_mismatch_rejected() {
        let catalog = setup();
        let err = validated("INSERT INTO db.users VALUES ('oops', 'a')", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_insert_int_range_checked_both_ends() {
        let catalog = setup();
        let err =
            validated("INSERT INTO db.users VALUES (2147483648, 'a')", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::IntOutOfRange { .. }));

        let err =
            validated("INSERT INTO db.users VALUES (-2147483649, 'a')", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::IntOutOfRange { .. }));

        assert!(validated("INSERT INTO db.users VALUES (-2147483648, 'a')", &catalog).is_ok());
    }

    #[test]
    fn test_insert_from_select_rejected() {
        let catalog = setup();
        let err = validated("INSERT INTO db.users SELECT * FROM db.users", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::Unsupported(_)));
    }

    #[test]
    fn test_create_table_duplicate() {
        let catalog = setup();
        let err = validated("CREATE TABLE db.users (id INT)", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::TableExists(_)));

        // IF NOT EXISTS tolerates the duplicate.
        assert!(
            validated("CREATE TABLE IF NOT EXISTS db.users (id INT)", &catalog).is_ok()
        );
    }

    #[test]
    fn test_create_table_unsupported_type() {
        let catalog = setup();
        let err = validated("CREATE TABLE db.t (x FLOAT)", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::Unsupported(_)));
    }

    #[test]
    fn test_create_table_duplicate_column() {
        let catalog = setup();
        let err = validated("CREATE TABLE db.t (id INT, id INT)", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateColumn(_)));
    }

    #[test]
    fn test_drop_table_if_exists_tolerated() {
        let catalog = setup();
        let err = validated("DROP TABLE db.missing", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownTable(_)));

        assert!(validated("DROP TABLE IF EXISTS db.missing", &catalog).is_ok());
    }

    #[test]
    fn test_create_index_unknown_column() {
        let catalog = setup();
        let err = validated("CREATE INDEX by_age ON db.users (age)", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownColumn { .. }));

        assert!(validated("CREATE INDEX by_name ON db.users (name)", &catalog).is_ok());
    }

    #[test]
    fn test_update_validates_assignments_and_where() {
        let catalog = setup();
        assert!(
            validated("UPDATE db.users SET name = 'y' WHERE id = 1", &catalog).is_ok()
        );
        let err = validated("UPDATE db.users SET age = 3", &catalog).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownColumn { .. }));
    }

    #[test]
    fn test_transaction_and_show_always_pass() {
        let catalog = Catalog::new();
        assert!(validated("BEGIN", &catalog).is_ok());
        assert!(validated("SHOW TABLES", &catalog).is_ok());
    }
}
