use std::{fmt::Display, sync::PoisonError};

use bincode::ErrorKind;

use crate::sql::types::{DataType, Value};

/// Custom Result type for ByteDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ByteDB
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// SQL parsing error
    Parse(String),
    /// Referenced table is not in the catalog
    TableNotFound(String),
    /// Referenced column is not in the table (or result set)
    ColumnNotFound(String),
    /// Table name already taken
    AlreadyExists(String),
    /// Value count does not match the target column count
    Arity { expected: usize, found: usize },
    /// Value kind does not match the column's declared type
    TypeMismatch {
        column: String,
        expected: DataType,
        value: Value,
    },
    /// NULL written to a column that does not accept it
    NullViolation(String),
    /// Duplicate value in a primary key or unique column
    ConstraintViolation { column: String, value: Value },
    /// Fewer bound parameters than placeholders
    ParameterMismatch { expected: usize, provided: usize },
    /// Internal error (storage, serialization, etc.)
    Internal(String),
}

impl From<std::num::ParseIntError> for Error {
    fn from(value: std::num::ParseIntError) -> Self {
        Error::Parse(value.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(value: std::num::ParseFloatError) -> Self {
        Error::Parse(value.to_string())
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(value: PoisonError<T>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<Box<ErrorKind>> for Error {
    fn from(value: Box<ErrorKind>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Internal(value.error.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error {}", err),
            Error::TableNotFound(name) => write!(f, "table '{}' not found", name),
            Error::ColumnNotFound(name) => write!(f, "column '{}' not found", name),
            Error::AlreadyExists(name) => write!(f, "table '{}' already exists", name),
            Error::Arity { expected, found } => write!(
                f,
                "value count mismatch: expected {} values, got {}",
                expected, found
            ),
            Error::TypeMismatch {
                column,
                expected,
                value,
            } => write!(
                f,
                "invalid value for column '{}': {} is not {}",
                column,
                value.quoted(),
                expected
            ),
            Error::NullViolation(column) => write!(f, "column '{}' cannot be null", column),
            Error::ConstraintViolation { column, value } => write!(
                f,
                "constraint violation: duplicate value {} for unique column '{}'",
                value.quoted(),
                column
            ),
            Error::ParameterMismatch { expected, provided } => write!(
                f,
                "not enough parameters for query placeholders: expected {}, got {}",
                expected, provided
            ),
            Error::Internal(err) => write!(f, "internal error {}", err),
        }
    }
}
