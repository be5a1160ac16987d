//! SQL front-end.
//!
//! Converts SQL text to the internal AST using the `sqlparser` crate. The
//! planning and execution core never sees `sqlparser` types; everything is
//! translated here.

use sqlparser::ast as sp;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser as SqlParser;

use super::ast::*;
use super::error::{ParseError, ParseResult};
use crate::catalog::{ColumnDef, Constraint, DataType};

/// SQL parser for shaledb.
pub struct Parser;

impl Parser {
    /// Parse a SQL string into a single statement.
    pub fn parse(sql: &str) -> ParseResult<Statement> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        // Transaction control and SHOW are recognized up front; the grammar
        // parser's support for them varies by dialect.
        let upper = sql.trim_end_matches(';').trim().to_uppercase();
        if upper == "BEGIN" || upper == "BEGIN TRANSACTION" || upper == "START TRANSACTION" {
            return Ok(Statement::Transaction(TransactionCommand::Begin));
        }
        if upper == "COMMIT" {
            return Ok(Statement::Transaction(TransactionCommand::Commit));
        }
        if upper == "ROLLBACK" {
            return Ok(Statement::Transaction(TransactionCommand::Rollback));
        }
        if upper == "SHOW TABLES" {
            return Ok(Statement::Show(Show {
                kind: ShowKind::Tables,
                table: None,
            }));
        }
        if upper.starts_with("SHOW COLUMNS FROM ") {
            let target = sql
                .trim_end_matches(';')
                .split_whitespace()
                .nth(3)
                .ok_or_else(|| ParseError::MissingClause("table name".into()))?;
            return Ok(Statement::Show(Show {
                kind: ShowKind::Columns,
                table: Some(Self::split_qualified(target)?),
            }));
        }

        let dialect = GenericDialect {};
        let statements = SqlParser::parse_sql(&dialect, sql)?;

        if statements.is_empty() {
            return Err(ParseError::EmptyQuery);
        }
        if statements.len() > 1 {
            return Err(ParseError::MultipleStatements);
        }

        Self::convert_statement(&statements[0])
    }

    fn convert_statement(stmt: &sp::Statement) -> ParseResult<Statement> {
        match stmt {
            sp::Statement::CreateTable(create) => Self::convert_create_table(create),
            sp::Statement::CreateIndex(create) => Self::convert_create_index(create),
            sp::Statement::Drop {
                object_type,
                names,
                if_exists,
                ..
            } => Self::convert_drop(object_type, names, *if_exists),
            sp::Statement::Query(query) => {
                Ok(Statement::Select(Self::convert_select(query)?))
            }
            sp::Statement::Insert(insert) => Self::convert_insert(insert),
            sp::Statement::Update {
                table,
                assignments,
                selection,
                ..
            } => Self::convert_update(table, assignments, selection),
            sp::Statement::Delete(delete) => Self::convert_delete(delete),
            sp::Statement::StartTransaction { .. } => {
                Ok(Statement::Transaction(TransactionCommand::Begin))
            }
            sp::Statement::Commit { .. } => {
                Ok(Statement::Transaction(TransactionCommand::Commit))
            }
            sp::Statement::Rollback { .. } => {
                Ok(Statement::Transaction(TransactionCommand::Rollback))
            }
            other => Err(ParseError::UnsupportedStatement(format!("{:?}", other))),
        }
    }

    fn convert_create_table(create: &sp::CreateTable) -> ParseResult<Statement> {
        let table = Self::extract_table_ref(&create.name)?;
        let columns = create
            .columns
            .iter()
            .map(Self::convert_column_def)
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Statement::CreateTable(CreateTable {
            table,
            columns,
            if_not_exists: create.if_not_exists,
        }))
    }

    fn convert_column_def(col: &sp::ColumnDef) -> ParseResult<ColumnDef> {
        let data_type = Self::convert_data_type(&col.data_type)?;
        let mut def = ColumnDef::new(col.name.value.clone(), data_type);
        for opt in &col.options {
            if let Some(constraint) = Self::convert_column_option(&opt.option)? {
                def = def.with_constraint(constraint);
            }
        }
        Ok(def)
    }

    fn convert_data_type(dt: &sp::DataType) -> ParseResult<DataType> {
        match dt {
            sp::DataType::Int(_) | sp::DataType::Integer(_) => Ok(DataType::Int),

            sp::DataType::BigInt(_) => Ok(DataType::Long),

            sp::DataType::Char(len) | sp::DataType::Character(len) => {
                Ok(DataType::Char(Self::character_length(len).unwrap_or(1)))
            }

            sp::DataType::Varchar(len) | sp::DataType::CharVarying(len) => {
                let n = Self::character_length(len)
                    .ok_or_else(|| ParseError::UnsupportedDataType("VARCHAR without length".into()))?;
                Ok(DataType::Varchar(n))
            }

            sp::DataType::Float(_) | sp::DataType::Real | sp::DataType::Double(_) => {
                Ok(DataType::Float)
            }

            sp::DataType::Boolean | sp::DataType::Bool => Ok(DataType::Boolean),

            sp::DataType::Date => Ok(DataType::Date),

            other => Err(ParseError::UnsupportedDataType(format!("{:?}", other))),
        }
    }

    fn character_length(len: &Option<sp::CharacterLength>) -> Option<u32> {
        match len {
            Some(sp::CharacterLength::IntegerLength { length, .. }) => Some(*length as u32),
            _ => None,
        }
    }

    fn convert_column_option(opt: &sp::ColumnOption) -> ParseResult<Option<Constraint>> {
        match opt {
            sp::ColumnOption::Null => Ok(None), // Nullable by default
            sp::ColumnOption::NotNull => Ok(Some(Constraint::NotNull)),
            sp::ColumnOption::Unique { is_primary, .. } => {
                if *is_primary {
                    Ok(Some(Constraint::PrimaryKey))
                } else {
                    Ok(Some(Constraint::Unique))
                }
            }
            _ => Ok(None), // Other constraints carry no meaning here
        }
    }

    fn convert_create_index(create: &sp::CreateIndex) -> ParseResult<Statement> {
        let index = create
            .name
            .as_ref()
            .and_then(|n| Self::object_name_parts(n).pop())
            .ok_or_else(|| ParseError::MissingClause("index name".into()))?;
        let table = Self::extract_table_ref(&create.table_name)?;
        let columns = create
            .columns
            .iter()
            .map(|c| match &c.expr {
                sp::Expr::Identifier(id) => Ok(id.value.clone()),
                other => Err(ParseError::UnsupportedExpression(format!(
                    "index column: {:?}",
                    other
                ))),
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Statement::CreateIndex(CreateIndex {
            table,
            index,
            columns,
            if_not_exists: create.if_not_exists,
        }))
    }

    fn convert_drop(
        object_type: &sp::ObjectType,
        names: &[sp::ObjectName],
        if_exists: bool,
    ) -> ParseResult<Statement> {
        if names.len() != 1 {
            return Err(ParseError::UnsupportedStatement(
                "DROP of multiple objects not supported".into(),
            ));
        }
        let parts = Self::object_name_parts(&names[0]);
        match object_type {
            sp::ObjectType::Table => Ok(Statement::DropTable(DropTable {
                table: Self::table_ref_from_parts(parts)?,
                if_exists,
            })),
            sp::ObjectType::Schema => {
                let schema = parts
                    .into_iter()
                    .next()
                    .ok_or_else(|| ParseError::InvalidIdentifier("empty schema name".into()))?;
                Ok(Statement::DropSchema(DropSchema { schema, if_exists }))
            }
            sp::ObjectType::Index => {
                // DROP INDEX schema.table.index
                if parts.len() != 3 {
                    return Err(ParseError::InvalidIdentifier(
                        "DROP INDEX expects schema.table.index".into(),
                    ));
                }
                let mut parts = parts.into_iter();
                let schema = parts.next().unwrap_or_default();
                let name = parts.next().unwrap_or_default();
                let index = parts.next().unwrap_or_default();
                Ok(Statement::DropIndex(DropIndex {
                    table: TableRef::new(schema, name),
                    index,
                    if_exists,
                }))
            }
            other => Err(ParseError::UnsupportedStatement(format!(
                "DROP {:?} not supported",
                other
            ))),
        }
    }

    fn convert_select(query: &sp::Query) -> ParseResult<Select> {
        let (select, set_operation) = Self::unwrap_body(query.body.as_ref())?;

        if select.from.len() != 1 {
            return Err(ParseError::UnsupportedStatement(
                "exactly one table in FROM required".into(),
            ));
        }
        let table = Self::extract_from_table(&select.from[0])?;

        let projection = select
            .projection
            .iter()
            .map(Self::convert_projection_item)
            .collect::<ParseResult<Vec<_>>>()?;

        let where_clause = select
            .selection
            .as_ref()
            .map(Self::convert_expr)
            .transpose()?;

        let group_by = match &select.group_by {
            sp::GroupByExpr::Expressions(exprs, _) => exprs
                .iter()
                .map(Self::convert_expr)
                .collect::<ParseResult<Vec<_>>>()?,
            sp::GroupByExpr::All(_) => {
                return Err(ParseError::UnsupportedStatement("GROUP BY ALL".into()))
            }
        };

        let order_by = query
            .order_by
            .as_ref()
            .map(Self::extract_order_by)
            .transpose()?
            .unwrap_or_default();

        let limit = query.limit.as_ref().map(Self::convert_expr).transpose()?;
        let offset = query
            .offset
            .as_ref()
            .map(|o| Self::convert_expr(&o.value))
            .transpose()?;

        Ok(Select {
            table,
            projection,
            where_clause,
            order_by,
            limit,
            offset,
            group_by,
            set_operation,
            with_clause: query.with.is_some(),
            locking: !query.locks.is_empty(),
        })
    }

    /// A UNION/INTERSECT/EXCEPT body surfaces as its left-most SELECT arm
    /// with the `set_operation` marker raised; rejecting the marker is the
    /// validator's job.
    fn unwrap_body(body: &sp::SetExpr) -> ParseResult<(&sp::Select, bool)> {
        match body {
            sp::SetExpr::Select(s) => Ok((s, false)),
            sp::SetExpr::SetOperation { left, .. } => {
                let (s, _) = Self::unwrap_body(left)?;
                Ok((s, true))
            }
            other => Err(ParseError::UnsupportedStatement(format!(
                "unsupported query body: {:?}",
                other
            ))),
        }
    }

    fn convert_projection_item(item: &sp::SelectItem) -> ParseResult<Expr> {
        match item {
            sp::SelectItem::Wildcard(_) => Ok(Expr::Star),
            sp::SelectItem::UnnamedExpr(expr) => Self::convert_expr(expr),
            // Aliases carry no meaning for positional output; keep the expression.
            sp::SelectItem::ExprWithAlias { expr, .. } => Self::convert_expr(expr),
            sp::SelectItem::QualifiedWildcard(name, _) => Err(
                ParseError::UnsupportedExpression(format!("qualified wildcard: {:?}", name)),
            ),
        }
    }

    fn extract_order_by(ob: &sp::OrderBy) -> ParseResult<Vec<OrderSpec>> {
        match &ob.kind {
            sp::OrderByKind::All(_) => Ok(Vec::new()),
            sp::OrderByKind::Expressions(exprs) => exprs
                .iter()
                .map(|e| {
                    Ok(OrderSpec {
                        expr: Self::convert_expr(&e.expr)?,
                        ascending: e.options.asc.unwrap_or(true),
                    })
                })
                .collect(),
        }
    }

    fn convert_insert(insert: &sp::Insert) -> ParseResult<Statement> {
        let table = match &insert.table {
            sp::TableObject::TableName(name) => Self::extract_table_ref(name)?,
            other => {
                return Err(ParseError::UnsupportedStatement(format!(
                    "INSERT target: {:?}",
                    other
                )))
            }
        };

        let columns = if insert.columns.is_empty() {
            None
        } else {
            Some(insert.columns.iter().map(|c| c.value.clone()).collect())
        };

        let (values, from_select) = match insert.source.as_ref().map(|s| s.body.as_ref()) {
            Some(sp::SetExpr::Values(sp::Values { rows, .. })) => {
                if rows.len() != 1 {
                    return Err(ParseError::UnsupportedStatement(
                        "multi-row INSERT not supported".into(),
                    ));
                }
                let row = rows[0]
                    .iter()
                    .map(Self::convert_expr)
                    .collect::<ParseResult<Vec<_>>>()?;
                (row, false)
            }
            // INSERT ... SELECT parses fine; the validator rejects it.
            Some(_) => (Vec::new(), true),
            None => {
                return Err(ParseError::MissingClause("VALUES".into()));
            }
        };

        Ok(Statement::Insert(Insert {
            table,
            columns,
            values,
            from_select,
        }))
    }

    fn convert_update(
        table: &sp::TableWithJoins,
        assignments: &[sp::Assignment],
        selection: &Option<sp::Expr>,
    ) -> ParseResult<Statement> {
        let table = Self::extract_from_table(table)?;

        let assignments = assignments
            .iter()
            .map(|a| {
                let column = Self::extract_assignment_target(&a.target)?;
                let value = Self::convert_expr(&a.value)?;
                Ok(Assignment { column, value })
            })
            .collect::<ParseResult<Vec<_>>>()?;

        let where_clause = selection.as_ref().map(Self::convert_expr).transpose()?;

        Ok(Statement::Update(Update {
            table,
            assignments,
            where_clause,
        }))
    }

    fn extract_assignment_target(target: &sp::AssignmentTarget) -> ParseResult<String> {
        match target {
            sp::AssignmentTarget::ColumnName(parts) => Self::object_name_parts(parts)
                .pop()
                .ok_or_else(|| ParseError::InvalidIdentifier("empty assignment target".into())),
            sp::AssignmentTarget::Tuple(_) => Err(ParseError::UnsupportedStatement(
                "tuple assignment not supported".into(),
            )),
        }
    }

    fn convert_delete(delete: &sp::Delete) -> ParseResult<Statement> {
        let tables = match &delete.from {
            sp::FromTable::WithFromKeyword(tables) => tables,
            sp::FromTable::WithoutKeyword(tables) => tables,
        };
        if tables.len() != 1 {
            return Err(ParseError::UnsupportedStatement(
                "DELETE from multiple tables not supported".into(),
            ));
        }

        let table = Self::extract_from_table(&tables[0])?;
        let where_clause = delete.selection.as_ref().map(Self::convert_expr).transpose()?;

        Ok(Statement::Delete(Delete {
            table,
            where_clause,
        }))
    }

    fn convert_expr(expr: &sp::Expr) -> ParseResult<Expr> {
        match expr {
            sp::Expr::Identifier(id) => Ok(Expr::Column(id.value.clone())),

            sp::Expr::CompoundIdentifier(parts) => {
                let col = parts
                    .last()
                    .map(|p| p.value.clone())
                    .ok_or_else(|| ParseError::InvalidIdentifier("empty identifier".into()))?;
                Ok(Expr::Column(col))
            }

            sp::Expr::Value(v) => Ok(Expr::Literal(Self::convert_value(v)?)),

            sp::Expr::BinaryOp { left, op, right } => {
                let l = Self::convert_expr(left)?;
                let r = Self::convert_expr(right)?;
                Ok(Expr::binary(l, Self::convert_binary_op(op)?, r))
            }

            sp::Expr::UnaryOp { op, expr } => Self::convert_unary(op, expr),

            sp::Expr::Nested(inner) => Self::convert_expr(inner),

            sp::Expr::Subquery(query) => {
                let select = Self::convert_select(query)?;
                Ok(Expr::Subquery(Box::new(select)))
            }

            sp::Expr::Function(f) => {
                let name = f.name.to_string();
                let args = match &f.args {
                    sp::FunctionArguments::List(list) => list
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            sp::FunctionArg::Unnamed(sp::FunctionArgExpr::Expr(e)) => {
                                Some(Self::convert_expr(e))
                            }
                            _ => None,
                        })
                        .collect::<ParseResult<Vec<_>>>()?,
                    _ => Vec::new(),
                };
                Ok(Expr::Function { name, args })
            }

            other => Err(ParseError::UnsupportedExpression(format!("{:?}", other))),
        }
    }

    fn convert_unary(op: &sp::UnaryOperator, expr: &sp::Expr) -> ParseResult<Expr> {
        let inner = Self::convert_expr(expr)?;
        match op {
            sp::UnaryOperator::Plus => Ok(inner),
            sp::UnaryOperator::Minus => match inner {
                // Negative literals arrive as unary minus; fold them.
                Expr::Literal(Value::Integer(i)) => Ok(Expr::Literal(Value::Integer(-i))),
                Expr::Literal(Value::Float(x)) => Ok(Expr::Literal(Value::Float(-x))),
                other => Ok(Expr::BinaryOp {
                    left: Some(Box::new(other)),
                    op: BinaryOperator::Minus,
                    right: None,
                }),
            },
            other => Err(ParseError::UnsupportedExpression(format!(
                "unary operator: {:?}",
                other
            ))),
        }
    }

    fn convert_value(v: &sp::ValueWithSpan) -> ParseResult<Value> {
        match &v.value {
            sp::Value::Null => Ok(Value::Null),
            sp::Value::Boolean(b) => Ok(Value::Boolean(*b)),
            sp::Value::Number(s, _) => {
                if let Ok(i) = s.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = s.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Err(ParseError::UnsupportedExpression(format!(
                        "invalid number: {}",
                        s
                    )))
                }
            }
            sp::Value::SingleQuotedString(s) | sp::Value::DoubleQuotedString(s) => {
                Ok(Value::String(s.clone()))
            }
            other => Err(ParseError::UnsupportedExpression(format!("{:?}", other))),
        }
    }

    fn convert_binary_op(op: &sp::BinaryOperator) -> ParseResult<BinaryOperator> {
        match op {
            sp::BinaryOperator::Eq => Ok(BinaryOperator::Eq),
            sp::BinaryOperator::NotEq => Ok(BinaryOperator::NotEq),
            sp::BinaryOperator::Lt => Ok(BinaryOperator::Lt),
            sp::BinaryOperator::LtEq => Ok(BinaryOperator::LtEq),
            sp::BinaryOperator::Gt => Ok(BinaryOperator::Gt),
            sp::BinaryOperator::GtEq => Ok(BinaryOperator::GtEq),
            sp::BinaryOperator::And => Ok(BinaryOperator::And),
            sp::BinaryOperator::Or => Ok(BinaryOperator::Or),
            sp::BinaryOperator::Plus => Ok(BinaryOperator::Plus),
            sp::BinaryOperator::Minus => Ok(BinaryOperator::Minus),
            sp::BinaryOperator::Multiply => Ok(BinaryOperator::Multiply),
            sp::BinaryOperator::Divide => Ok(BinaryOperator::Divide),
            other => Err(ParseError::UnsupportedExpression(format!(
                "operator: {:?}",
                other
            ))),
        }
    }

    fn extract_from_table(twj: &sp::TableWithJoins) -> ParseResult<TableRef> {
        if !twj.joins.is_empty() {
            return Err(ParseError::UnsupportedStatement("JOIN not supported".into()));
        }
        match &twj.relation {
            sp::TableFactor::Table { name, .. } => Self::extract_table_ref(name),
            other => Err(ParseError::UnsupportedStatement(format!(
                "table factor: {:?}",
                other
            ))),
        }
    }

    fn extract_table_ref(name: &sp::ObjectName) -> ParseResult<TableRef> {
        Self::table_ref_from_parts(Self::object_name_parts(name))
    }

    /// 2 parts are `schema.table`; 1 part parses with an empty schema and is
    /// left for semantic validation to reject.
    fn table_ref_from_parts(parts: Vec<String>) -> ParseResult<TableRef> {
        let mut parts = parts.into_iter();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, _) => Ok(TableRef::new("", name)),
            (Some(schema), Some(name), None) => Ok(TableRef::new(schema, name)),
            _ => Err(ParseError::InvalidIdentifier(
                "expected schema.table".into(),
            )),
        }
    }

    fn split_qualified(target: &str) -> ParseResult<TableRef> {
        Self::table_ref_from_parts(target.split('.').map(str::to_string).collect())
    }

    fn object_name_parts(name: &sp::ObjectName) -> Vec<String> {
        name.0
            .iter()
            .map(|p| {
                p.as_ident()
                    .map(|id| id.value.clone())
                    .unwrap_or_else(|| p.to_string())
            })
            .collect()
    }
}
