//! Streaming operators: the executable counterparts of plan nodes.
//!
//! Operators follow a pull protocol. `pull` returns `Err` for an
//! unrecoverable error in this subtree, `Ok(None)` for end-of-stream, and
//! `Ok(Some(row))` for exactly one row; callers pull again for the next.

use std::sync::Arc;

use crate::catalog::Table;
use crate::planner::PlanNode;
use crate::sql::Value;
use crate::storage::{TableStore, TupleId};

use super::error::{ExecuteError, ExecuteResult};

/// A decoded row plus its storage identity, handed upward between operators.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleIter {
    pub tuple: TupleId,
    pub values: Vec<Value>,
}

pub trait Operator {
    /// Produce the next output row, or `None` at end-of-stream.
    fn pull(&mut self) -> ExecuteResult<Option<TupleIter>>;
}

/// Instantiate the operator for a streaming plan subtree.
///
/// Only scan-shaped nodes appear below DML/SELECT roots; the root nodes
/// themselves are dispatched by the executor, not built here.
pub fn build_operator(node: &PlanNode) -> ExecuteResult<Box<dyn Operator>> {
    match node {
        PlanNode::SeqScan { table } => Ok(Box::new(SeqScanOperator::new(Arc::clone(table)))),
        PlanNode::Filter {
            column,
            value,
            source,
        } => {
            let child = build_operator(source)?;
            Ok(Box::new(FilterOperator::new(*column, value.clone(), child)))
        }
        other => Err(ExecuteError::Unsupported(format!("{:?}", other))),
    }
}

/// Cursor-based full-table scan.
pub struct SeqScanOperator {
    table: Arc<Table>,
    cursor: Option<TupleId>,
    finished: bool,
}

impl SeqScanOperator {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            cursor: None,
            finished: false,
        }
    }
}

impl Operator for SeqScanOperator {
    fn pull(&mut self) -> ExecuteResult<Option<TupleIter>> {
        // Once the store reports the end, the flag latches; the scan never
        // restarts.
        if self.finished {
            return Ok(None);
        }
        let store = self.table.store().read();
        match store.scan_next(self.cursor) {
            Some(next) => {
                let values = store.decode(next)?;
                self.cursor = Some(next);
                Ok(Some(TupleIter {
                    tuple: next,
                    values,
                }))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}

/// Keeps rows whose value at a resolved column index equals one literal.
pub struct FilterOperator {
    column: usize,
    value: Value,
    source: Box<dyn Operator>,
}

impl FilterOperator {
    pub fn new(column: usize, value: Value, source: Box<dyn Operator>) -> Self {
        Self {
            column,
            value,
            source,
        }
    }

    /// Type-matched equality. A type mismatch between the row's value and
    /// the literal is a non-match, not an error, and NULL matches nothing.
    fn matches(row_value: &Value, literal: &Value) -> bool {
        match (row_value, literal) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Operator for FilterOperator {
    fn pull(&mut self) -> ExecuteResult<Option<TupleIter>> {
        loop {
            let row = match self.source.pull()? {
                Some(row) => row,
                None => return Ok(None),
            };
            let matched = row
                .values
                .get(self.column)
                .map(|v| Self::matches(v, &self.value))
                .unwrap_or(false);
            if matched {
                return Ok(Some(row));
            }
        }
    }
}

/// Run an operator to exhaustion, collecting every row it produces.
/// A child error discards the partial batch.
pub fn drain(op: &mut dyn Operator) -> ExecuteResult<Vec<TupleIter>> {
    let mut rows = Vec::new();
    while let Some(row) = op.pull()? {
        rows.push(row);
    }
    Ok(rows)
}
