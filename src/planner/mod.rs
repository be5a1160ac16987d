//! Plan construction.
//!
//! Lowers validated statements into trees of physical plan nodes with column
//! names resolved to positional indices and table names resolved to live
//! catalog handles.

mod builder;
mod error;
mod plan;

pub use builder::PlanBuilder;
pub use error::{PlanError, PlanResult};
pub use plan::{OutputColumn, PlanNode};
