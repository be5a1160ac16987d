//! Physical plan representation.
//!
//! A plan is a tree of tagged nodes. A node's `source` is the operator that
//! feeds it rows, so `Select -> Filter -> SeqScan` reads bottom-up: scan the
//! table, keep matching rows, project them. Each node owns its source
//! exclusively. Table references are live catalog handles resolved at build
//! time, and column references are positional indices into the table's
//! declared column order.

use std::sync::Arc;

use crate::catalog::{ColumnDef, Index, Table};
use crate::sql::{TableRef, TransactionCommand, Value};

/// One projected output column of a Select node: the declared column
/// definition plus its positional index in the scanned tuple.
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub column: ColumnDef,
    pub index: usize,
}

/// Physical plan nodes.
#[derive(Debug, Clone)]
pub enum PlanNode {
    CreateTable {
        table: TableRef,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    },

    CreateIndex {
        table: Arc<Table>,
        index: String,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    },

    DropTable {
        table: TableRef,
        if_exists: bool,
    },

    DropSchema {
        schema: String,
        if_exists: bool,
    },

    DropIndex {
        table: TableRef,
        index: String,
        if_exists: bool,
    },

    /// Values are already normalized to declared-column order; no source.
    Insert {
        table: Arc<Table>,
        values: Vec<Value>,
    },

    /// Assignments are (column index, new value) pairs.
    Update {
        table: Arc<Table>,
        assignments: Vec<(usize, Value)>,
        source: Box<PlanNode>,
    },

    Delete {
        table: Arc<Table>,
        source: Box<PlanNode>,
    },

    Select {
        outputs: Vec<OutputColumn>,
        source: Box<PlanNode>,
    },

    /// Full-table cursor scan.
    SeqScan { table: Arc<Table> },

    /// Single equality predicate: keep rows whose value at `column` equals
    /// `value`.
    Filter {
        column: usize,
        value: Value,
        source: Box<PlanNode>,
    },

    /// Defined for completeness; the builder never produces one.
    IndexScan { table: Arc<Table>, index: Index },

    /// Defined for completeness; the builder never produces one.
    Sort {
        keys: Vec<(usize, bool)>,
        source: Box<PlanNode>,
    },

    /// Defined for completeness; the builder never produces one.
    Limit {
        limit: Option<u64>,
        offset: Option<u64>,
        source: Box<PlanNode>,
    },

    Transaction(TransactionCommand),

    ShowTables,

    ShowColumns { table: TableRef },
}
