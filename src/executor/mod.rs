//! Pull-based execution engine.

mod error;
mod executor;
mod operators;
mod result;

pub use error::{ExecuteError, ExecuteResult};
pub use executor::Executor;
pub use operators::{build_operator, FilterOperator, Operator, SeqScanOperator, TupleIter};
pub use result::{QueryResult, ResultSet};
