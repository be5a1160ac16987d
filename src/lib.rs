//! ShaleDB - a small relational database engine core.
//!
//! Implements the planning and execution pipeline of a relational database:
//! a typed schema catalog, a semantic validator, a plan builder and a
//! pull-based (Volcano) execution engine. SQL parsing, physical storage and
//! transactions are narrow collaborator interfaces with in-memory defaults.
//!
//! # Example
//!
//! ```
//! use shaledb::db::Database;
//!
//! let mut db = Database::new();
//! db.execute("CREATE TABLE app.users (id INT, name VARCHAR(10))").unwrap();
//! db.execute("INSERT INTO app.users VALUES (1, 'alice')").unwrap();
//! let result = db.execute("SELECT name FROM app.users WHERE id = 1").unwrap();
//! assert_eq!(result.rows().unwrap().len(), 1);
//! ```

pub mod catalog;
pub mod db;
pub mod executor;
pub mod planner;
pub mod sql;
pub mod storage;
pub mod transaction;
pub mod validator;
