//! High-level database API.
//!
//! Wires the full statement pipeline together: parse, validate against the
//! catalog, lower to a physical plan, execute.

use thiserror::Error;

use crate::catalog::Catalog;
use crate::executor::{ExecuteError, Executor, QueryResult};
use crate::planner::{PlanBuilder, PlanError};
use crate::sql::{ParseError, Parser};
use crate::storage::{MemoryEngine, StorageEngine};
use crate::transaction::{LocalTransactionManager, TransactionManager};
use crate::validator::{SemanticError, Validator};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database errors, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("execution error: {0}")]
    Execute(#[from] ExecuteError),
}

/// An in-process database instance.
pub struct Database {
    catalog: Catalog,
    engine: Box<dyn StorageEngine>,
    tx: Box<dyn TransactionManager>,
}

impl Database {
    /// Open a database backed by the in-memory storage engine.
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(MemoryEngine),
            Box::new(LocalTransactionManager::new()),
        )
    }

    /// Open a database over caller-supplied storage and transaction
    /// collaborators.
    pub fn with_collaborators(
        engine: Box<dyn StorageEngine>,
        tx: Box<dyn TransactionManager>,
    ) -> Self {
        Self {
            catalog: Catalog::new(),
            engine,
            tx,
        }
    }

    /// Run one SQL statement to completion.
    pub fn execute(&mut self, sql: &str) -> DatabaseResult<QueryResult> {
        let mut stmt = Parser::parse(sql)?;
        Validator::validate(&mut stmt, &self.catalog)?;
        let plan = PlanBuilder::build(&stmt, &self.catalog)?;
        let mut executor = Executor::new(&mut self.catalog, self.engine.as_ref(), self.tx.as_mut());
        Ok(executor.execute(plan)?)
    }

    /// The schema catalog, read-only.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
