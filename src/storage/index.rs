use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sql::types::{Row, Value, integral};

/// Hashable form of a `Value`.
///
/// Floats holding an integral value hash as integers so that a lookup with
/// `3` finds cells stored as `3.0`, in line with `Value::matches`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKey {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    String(String),
}

impl From<&Value> for IndexKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => IndexKey::Null,
            Value::Boolean(b) => IndexKey::Boolean(*b),
            Value::Integer(i) => IndexKey::Integer(*i),
            Value::Float(f) => match integral(*f) {
                Some(i) => IndexKey::Integer(i),
                None => IndexKey::Float(f.to_bits()),
            },
            Value::String(s) => IndexKey::String(s.clone()),
        }
    }
}

/// Hash index over one column: value -> positions of the rows holding it.
///
/// Positions are offsets into the table's row vector and are kept in
/// ascending order, so index lookups return rows in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashIndex {
    pub name: String,
    pub column: String,
    entries: HashMap<IndexKey, Vec<usize>>,
}

impl HashIndex {
    /// Builds an index by scanning every row; `pos` is the column's offset in a row
    pub fn build(name: String, column: String, pos: usize, rows: &[Row]) -> Self {
        let mut index = Self {
            name,
            column,
            entries: HashMap::new(),
        };
        for (i, row) in rows.iter().enumerate() {
            index.insert(&row[pos], i);
        }
        index
    }

    /// Records that the row at `position` holds `value`
    pub fn insert(&mut self, value: &Value, position: usize) {
        self.entries.entry(IndexKey::from(value)).or_default().push(position);
    }

    /// Returns the positions of rows holding `value`
    pub fn lookup(&self, value: &Value) -> &[usize] {
        // NaN equals nothing, not even a NaN with the same bits
        if matches!(value, Value::Float(f) if f.is_nan()) {
            return &[];
        }
        self.entries
            .get(&IndexKey::from(value))
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::HashIndex;
    use crate::sql::types::Value;

    #[test]
    fn test_build_and_lookup() {
        let rows = vec![
            vec![Value::Integer(1), Value::from("a")],
            vec![Value::Integer(2), Value::from("b")],
            vec![Value::Integer(3), Value::from("a")],
            vec![Value::Integer(4), Value::Null],
        ];
        let mut index = HashIndex::build("idx".into(), "name".into(), 1, &rows);
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(&Value::from("a")), &[0, 2]);
        assert_eq!(index.lookup(&Value::Null), &[3]);
        assert!(index.lookup(&Value::from("zzz")).is_empty());

        index.insert(&Value::from("b"), 4);
        assert_eq!(index.lookup(&Value::from("b")), &[1, 4]);
    }

    #[test]
    fn test_numeric_keys() {
        let rows = vec![vec![Value::Float(3.0)], vec![Value::Float(2.5)]];
        let index = HashIndex::build("idx".into(), "price".into(), 0, &rows);
        assert_eq!(index.lookup(&Value::Integer(3)), &[0]);
        assert_eq!(index.lookup(&Value::Float(2.5)), &[1]);
        assert!(index.lookup(&Value::Integer(2)).is_empty());
    }

    #[test]
    fn test_keys_follow_value_equality() {
        let rows = vec![
            vec![Value::Float(9_007_199_254_740_992.0)],
            vec![Value::Float(-0.0)],
            vec![Value::Float(f64::NAN)],
        ];
        let index = HashIndex::build("idx".into(), "v".into(), 0, &rows);
        for needle in [
            Value::Integer(9_007_199_254_740_992),
            Value::Integer(9_007_199_254_740_993),
            Value::Float(0.0),
            Value::Integer(0),
            Value::Float(f64::NAN),
        ] {
            let scanned = rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r[0].matches(&needle))
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            assert_eq!(index.lookup(&needle), scanned.as_slice(), "lookup {:?}", needle);
        }
    }
}
