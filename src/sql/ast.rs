//! Internal AST types for shaledb SQL.
//!
//! These are the statement and expression shapes the validator, planner, and
//! executor understand. The front-end in `parser.rs` produces them; embedding
//! applications may also construct them directly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ColumnDef;

/// A parsed SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement.
    CreateTable(CreateTable),
    /// CREATE INDEX statement.
    CreateIndex(CreateIndex),
    /// DROP TABLE statement.
    DropTable(DropTable),
    /// DROP SCHEMA statement.
    DropSchema(DropSchema),
    /// DROP INDEX statement.
    DropIndex(DropIndex),
    /// SELECT statement.
    Select(Select),
    /// INSERT statement.
    Insert(Insert),
    /// UPDATE statement.
    Update(Update),
    /// DELETE statement.
    Delete(Delete),
    /// BEGIN / COMMIT / ROLLBACK.
    Transaction(TransactionCommand),
    /// SHOW TABLES / SHOW COLUMNS.
    Show(Show),
}

/// A schema-qualified table reference.
///
/// Every object in the engine lives under a schema; an unqualified name
/// parses with an empty schema and fails semantic validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub table: TableRef,
    pub index: String,
    /// Names of the covered columns, in index order.
    pub columns: Vec<String>,
    pub if_not_exists: bool,
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub table: TableRef,
    pub if_exists: bool,
}

/// DROP SCHEMA statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropSchema {
    pub schema: String,
    pub if_exists: bool,
}

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndex {
    pub table: TableRef,
    pub index: String,
    pub if_exists: bool,
}

/// SELECT statement.
///
/// The clause markers (`group_by`, `set_operation`, `with_clause`,
/// `locking`) exist so the validator can reject them as unsupported; the
/// planner never consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: TableRef,
    pub projection: Vec<Expr>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderSpec>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub set_operation: bool,
    pub with_clause: bool,
    pub locking: bool,
}

impl Select {
    /// A bare `SELECT <projection> FROM <table>` with no other clauses.
    pub fn new(table: TableRef, projection: Vec<Expr>) -> Self {
        Self {
            table,
            projection,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            group_by: Vec::new(),
            set_operation: false,
            with_clause: false,
            locking: false,
        }
    }
}

/// ORDER BY clause item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub expr: Expr,
    pub ascending: bool,
}

/// INSERT statement. Holds exactly one row of values; the validator
/// normalizes `values` into declared-column order in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    /// Explicit column list, if one was written.
    pub columns: Option<Vec<String>>,
    pub values: Vec<Expr>,
    /// Marks `INSERT INTO ... SELECT ...`, which is rejected as unsupported.
    pub from_select: bool,
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

/// SET clause assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub where_clause: Option<Expr>,
}

/// Transaction-control command, forwarded verbatim to the transaction
/// manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCommand {
    Begin,
    Commit,
    Rollback,
}

/// SHOW statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub kind: ShowKind,
    /// Target table for SHOW COLUMNS; ignored by SHOW TABLES.
    pub table: Option<TableRef>,
}

/// What a SHOW statement enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    Tables,
    Columns,
}

/// SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value.
    Literal(Value),
    /// `*` in a select list.
    Star,
    /// Column reference.
    Column(String),
    /// Binary operation. Either operand may be absent, covering unary and
    /// partial forms.
    BinaryOp {
        left: Option<Box<Expr>>,
        op: BinaryOperator,
        right: Option<Box<Expr>>,
    },
    /// Correlated sub-select.
    Subquery(Box<Select>),
    /// Function call. Never supported; exists so validation has a concrete
    /// shape to reject.
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    pub fn integer(i: i64) -> Self {
        Expr::Literal(Value::Integer(i))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Value::String(s.into()))
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    /// `left op right` with both operands present.
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Some(Box::new(left)),
            op,
            right: Some(Box::new(right)),
        }
    }

    /// `column = value`, the one predicate shape the planner accepts.
    pub fn equals(column: impl Into<String>, value: Value) -> Self {
        Expr::binary(Expr::column(column), BinaryOperator::Eq, Expr::Literal(value))
    }
}

/// Literal value, also the runtime representation of a decoded tuple field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Human-readable name of the value's runtime type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_display() {
        let t = TableRef::new("db", "users");
        assert_eq!(t.to_string(), "db.users");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::String("ab".into()).to_string(), "ab");
    }

    #[test]
    fn test_equals_shape() {
        let e = Expr::equals("id", Value::Integer(1));
        match e {
            Expr::BinaryOp { left, op, right } => {
                assert_eq!(op, BinaryOperator::Eq);
                assert_eq!(*left.unwrap(), Expr::column("id"));
                assert_eq!(*right.unwrap(), Expr::integer(1));
            }
            other => panic!("unexpected expr: {:?}", other),
        }
    }
}
