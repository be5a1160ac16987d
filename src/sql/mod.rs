//! SQL parsing and the internal statement AST.

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{
    Assignment, BinaryOperator, CreateIndex, CreateTable, Delete, DropIndex, DropSchema,
    DropTable, Expr, Insert, OrderSpec, Select, Show, ShowKind, Statement, TableRef,
    TransactionCommand, Update, Value,
};
pub use error::{ParseError, ParseResult};
pub use parser::Parser;
