//! Query results.

use std::fmt;

use crate::sql::Value;

/// A batch of projected rows with their output column names.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// SELECT and SHOW output.
    Rows(ResultSet),
    /// INSERT/UPDATE/DELETE with an affected-row count.
    Modified { rows_affected: usize },
    /// DDL and transaction control.
    Success { message: String },
}

impl QueryResult {
    pub fn success(message: impl Into<String>) -> Self {
        QueryResult::Success {
            message: message.into(),
        }
    }

    /// The row batch, if this result carries one.
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            QueryResult::Rows(set) => Some(set),
            _ => None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(set) => write!(f, "{}", set),
            QueryResult::Modified { rows_affected } => {
                write!(f, "{} row(s) affected", rows_affected)
            }
            QueryResult::Success { message } => write!(f, "{}", message),
        }
    }
}
