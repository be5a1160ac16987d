//! Data types and column definitions for table schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::Value;

/// Declared SQL data types.
///
/// Only `Int`, `Long`, `Char` and `Varchar` are supported by the execution
/// path; the remaining variants are parseable and rejected by CREATE TABLE
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Fixed-length string with declared maximum length.
    Char(u32),
    /// Variable-length string with declared maximum length.
    Varchar(u32),
    /// Parseable but unsupported.
    Float,
    /// Parseable but unsupported.
    Boolean,
    /// Parseable but unsupported.
    Date,
}

impl DataType {
    /// Whether the execution path supports columns of this type.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::Long | DataType::Char(_) | DataType::Varchar(_)
        )
    }

    /// Declared maximum length for character types.
    pub fn length(&self) -> Option<u32> {
        match self {
            DataType::Char(n) | DataType::Varchar(n) => Some(*n),
            _ => None,
        }
    }

    /// SQL descriptor for this type. Character types are length-qualified,
    /// as SHOW COLUMNS prints them.
    pub fn sql_name(&self) -> String {
        match self {
            DataType::Int => "INT".into(),
            DataType::Long => "LONG".into(),
            DataType::Char(n) => format!("CHAR({})", n),
            DataType::Varchar(n) => format!("VARCHAR({})", n),
            DataType::Float => "FLOAT".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::Date => "DATE".into(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Column constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Column cannot be null.
    NotNull,
    /// Column values must be unique across all rows.
    Unique,
    /// Column is the primary key (implies NotNull + Unique).
    PrimaryKey,
}

impl Constraint {
    /// Check if this constraint forbids null values.
    pub fn is_not_null(&self) -> bool {
        matches!(self, Constraint::NotNull | Constraint::PrimaryKey)
    }
}

/// Full column definition: name, declared type, nullability, constraints.
/// Immutable once its table is created; every table owns its own copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl ColumnDef {
    /// Create a new nullable, unconstrained column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint to this column.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        if constraint.is_not_null() {
            self.nullable = false;
        }
        self.constraints.push(constraint);
        self
    }

    /// Whether a runtime literal matches this column's declared type without
    /// regard to size limits.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.data_type, value) {
            (DataType::Int | DataType::Long, Value::Integer(_)) => true,
            (DataType::Char(_) | DataType::Varchar(_), Value::String(_)) => true,
            (_, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        assert!(DataType::Int.is_supported());
        assert!(DataType::Varchar(16).is_supported());
        assert!(!DataType::Float.is_supported());
        assert!(!DataType::Date.is_supported());
    }

    #[test]
    fn test_length_qualified_descriptor() {
        assert_eq!(DataType::Char(10).sql_name(), "CHAR(10)");
        assert_eq!(DataType::Varchar(255).sql_name(), "VARCHAR(255)");
        assert_eq!(DataType::Int.sql_name(), "INT");
    }

    #[test]
    fn test_not_null_constraint_clears_nullable() {
        let col = ColumnDef::new("id", DataType::Int).with_constraint(Constraint::NotNull);
        assert!(!col.nullable);

        let pk = ColumnDef::new("id", DataType::Int).with_constraint(Constraint::PrimaryKey);
        assert!(!pk.nullable);
    }

    #[test]
    fn test_accepts_runtime_values() {
        let col = ColumnDef::new("name", DataType::Varchar(5));
        assert!(col.accepts(&Value::String("ab".into())));
        assert!(col.accepts(&Value::Null));
        assert!(!col.accepts(&Value::Integer(3)));
    }
}
