use std::fmt::Display;

use serde::{Deserialize, Serialize};
use crate::sql::parser::ast::Consts;

/// Supported SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Text,
    Boolean,
    Float,
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
            DataType::Float => "FLOAT",
        })
    }
}

/// Runtime value of a single cell, literal or bound parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Creates a Value from a parsed constant
    pub fn from_consts(consts: Consts) -> Self {
        match consts {
            Consts::Null => Self::Null,
            Consts::Boolean(b) => Self::Boolean(b),
            Consts::Integer(i) => Self::Integer(i),
            Consts::Float(f) => Self::Float(f),
            Consts::String(s) => Self::String(s),
        }
    }

    /// Returns the data type of the value, or None if it's Null
    pub fn datatype(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Integer(_) => Some(DataType::Integer),
            Self::Float(_) => Some(DataType::Float),
            Self::String(_) => Some(DataType::Text),
        }
    }

    /// Equality used by WHERE predicates.
    ///
    /// Integers and floats compare exactly: a float equals an integer only
    /// when it holds that very integer. NULL only matches NULL, so
    /// `WHERE c = NULL` finds the rows whose cell is empty. JOIN keys use
    /// the same rule.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                integral(*b) == Some(*a)
            }
            (a, b) => a == b,
        }
    }

    /// Renders the value the way error messages quote it
    pub fn quoted(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s),
            v => v.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) if *b => write!(f, "TRUE"),
            Value::Boolean(_) => write!(f, "FALSE"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// The integer a float holds exactly, if any.
///
/// Hash index keys are derived with the same rule, so index lookups and
/// scans agree.
pub fn integral(f: f64) -> Option<i64> {
    // [-2^63, 2^63) is exactly the range of floats that fit an i64
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (-BOUND..BOUND).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// A row holds one value per declared column, in declaration order
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::{Value, integral};

    #[test]
    fn test_value_matches() {
        assert!(Value::Integer(3).matches(&Value::Float(3.0)));
        assert!(Value::Float(2.5).matches(&Value::Float(2.5)));
        assert!(!Value::Integer(1).matches(&Value::String("1".into())));
        assert!(!Value::Boolean(true).matches(&Value::Integer(1)));
        assert!(Value::Null.matches(&Value::Null));
        assert!(!Value::Null.matches(&Value::Integer(0)));
    }

    #[test]
    fn test_large_numbers_compare_exactly() {
        let big = Value::Float(9_007_199_254_740_992.0);
        assert!(big.matches(&Value::Integer(9_007_199_254_740_992)));
        // 2^53 + 1 rounds to 2^53 as a float, but they are different numbers
        assert!(!big.matches(&Value::Integer(9_007_199_254_740_993)));
        assert!(!Value::Integer(i64::MAX).matches(&Value::Float(i64::MAX as f64)));
        assert_eq!(integral(-0.0), Some(0));
        assert_eq!(integral(i64::MIN as f64), Some(i64::MIN));
        assert_eq!(integral(f64::NAN), None);
        assert_eq!(integral(1e19), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(50.0).to_string(), "50.0");
        assert_eq!(Value::Boolean(false).to_string(), "FALSE");
        assert_eq!(Value::from("Alice").quoted(), "'Alice'");
        assert_eq!(Value::Integer(1).quoted(), "1");
    }
}
