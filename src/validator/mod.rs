//! Semantic validation against the catalog.

pub mod error;
pub mod validate;

pub use error::{SemanticError, SemanticResult};
pub use validate::Validator;
