use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::types::{DataType, Row, Value},
    storage::index::{HashIndex, IndexKey},
};

/// Table definition together with its rows and hash indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns in declaration order (the order positional INSERT uses)
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// Hash indices keyed by indexed column name
    pub indexes: BTreeMap<String, HashIndex>,
}

impl Table {
    pub fn new(name: String, columns: Vec<Column>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Internal(format!(
                "table {} has no columns",
                self.name
            )));
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::Internal(format!(
                    "duplicate column {} in table {}",
                    col.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Checks rows and index definitions against the schema.
    ///
    /// Tables built through `add_row` always pass; this guards tables read
    /// back from storage before any row is indexed.
    pub fn check_integrity(&self) -> Result<()> {
        self.validate()?;
        for (n, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(Error::Internal(format!(
                    "row {} of table {} has {} values for {} columns",
                    n,
                    self.name,
                    row.len(),
                    self.columns.len()
                )));
            }
            for (col, value) in self.columns.iter().zip(row) {
                col.validate(value.clone())?;
                // stored FLOAT cells are always widened
                if col.datatype == DataType::Float && matches!(value, Value::Integer(_)) {
                    return Err(Error::TypeMismatch {
                        column: col.name.clone(),
                        expected: col.datatype,
                        value: value.clone(),
                    });
                }
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if !col.is_unique() {
                continue;
            }
            let mut seen = HashSet::new();
            for row in &self.rows {
                let value = &row[i];
                if matches!(value, Value::Null) || matches!(value, Value::Float(f) if f.is_nan()) {
                    continue;
                }
                if !seen.insert(IndexKey::from(value)) {
                    return Err(Error::ConstraintViolation {
                        column: col.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        for (col_name, index) in &self.indexes {
            if index.column != *col_name {
                return Err(Error::Internal(format!(
                    "index {} is filed under column {} but covers {}",
                    index.name, col_name, index.column
                )));
            }
            self.get_col_index(col_name)?;
        }
        Ok(())
    }

    /// Returns the column index for a given column name
    pub fn get_col_index(&self, col_name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == col_name)
            .ok_or_else(|| Error::ColumnNotFound(col_name.to_string()))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Validates and appends a row, then records it in every index.
    ///
    /// All checks run before anything is written: on error the table is unchanged.
    pub fn add_row(&mut self, row: Row) -> Result<usize> {
        if row.len() != self.columns.len() {
            return Err(Error::Arity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        let row = self
            .columns
            .iter()
            .zip(row)
            .map(|(col, value)| col.validate(value))
            .collect::<Result<Row>>()?;

        for (i, col) in self.columns.iter().enumerate() {
            if !col.is_unique() || row[i] == Value::Null {
                continue;
            }
            // Linear scan, indices are not consulted for constraint checks
            if self.rows.iter().any(|r| r[i].matches(&row[i])) {
                return Err(Error::ConstraintViolation {
                    column: col.name.clone(),
                    value: row[i].clone(),
                });
            }
        }

        let position = self.rows.len();
        for index in self.indexes.values_mut() {
            let pos = self
                .columns
                .iter()
                .position(|c| c.name == index.column)
                .ok_or_else(|| Error::ColumnNotFound(index.column.clone()))?;
            index.insert(&row[pos], position);
        }
        self.rows.push(row);
        Ok(position)
    }

    /// Builds a hash index over `col_name` from the current rows
    pub fn create_index(&mut self, name: String, col_name: &str) -> Result<()> {
        let pos = self.get_col_index(col_name)?;
        let index = HashIndex::build(name, col_name.to_string(), pos, &self.rows);
        debug!(table = %self.name, column = col_name, keys = index.len(), "built hash index");
        self.indexes.insert(col_name.to_string(), index);
        Ok(())
    }

    /// Rebuilds every index from scratch after rows moved or changed
    pub fn rebuild_indexes(&mut self) -> Result<()> {
        let specs = self
            .indexes
            .values()
            .map(|i| (i.name.clone(), i.column.clone()))
            .collect::<Vec<_>>();
        for (name, column) in specs {
            self.create_index(name, &column)?;
        }
        Ok(())
    }

    /// Positions of the rows matching `col = value`, in row order.
    ///
    /// Uses the column's hash index when there is one, otherwise scans.
    pub fn find_rows(&self, col_name: &str, value: &Value) -> Result<Vec<usize>> {
        let pos = self.get_col_index(col_name)?;
        if let Some(index) = self.indexes.get(col_name) {
            return Ok(index.lookup(value).to_vec());
        }
        Ok(self.scan_rows(pos, value))
    }

    fn scan_rows(&self, pos: usize, value: &Value) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[pos].matches(value))
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions of the rows an UPDATE/DELETE with this filter touches (full scan)
    fn matching_rows(&self, filter: Option<&(String, Value)>) -> Result<Vec<usize>> {
        match filter {
            Some((col, value)) => Ok(self.scan_rows(self.get_col_index(col)?, value)),
            None => Ok((0..self.rows.len()).collect()),
        }
    }

    /// Applies `assignments` to every row matching `filter`, returns the count.
    ///
    /// Types, nullability and uniqueness are checked for all rows before any
    /// row is modified. Indices are rebuilt afterwards.
    pub fn update_rows(
        &mut self,
        filter: Option<&(String, Value)>,
        assignments: &BTreeMap<String, Value>,
    ) -> Result<usize> {
        let targets = self.matching_rows(filter)?;

        let mut changes = Vec::with_capacity(assignments.len());
        for (col_name, value) in assignments {
            let pos = self.get_col_index(col_name)?;
            let column = &self.columns[pos];
            let value = column.validate(value.clone())?;
            if column.is_unique() && value != Value::Null && !targets.is_empty() {
                let collides = targets.len() > 1
                    || self
                        .rows
                        .iter()
                        .enumerate()
                        .any(|(i, r)| targets.binary_search(&i).is_err() && r[pos].matches(&value));
                if collides {
                    return Err(Error::ConstraintViolation {
                        column: column.name.clone(),
                        value,
                    });
                }
            }
            changes.push((pos, value));
        }

        for &i in &targets {
            for (pos, value) in &changes {
                self.rows[i][*pos] = value.clone();
            }
        }
        if !targets.is_empty() {
            self.rebuild_indexes()?;
        }
        Ok(targets.len())
    }

    /// Removes every row matching `filter` (all rows when None), returns the count
    pub fn delete_rows(&mut self, filter: Option<&(String, Value)>) -> Result<usize> {
        let targets = self.matching_rows(filter)?;
        if targets.is_empty() {
            return Ok(0);
        }
        let mut i = 0;
        self.rows.retain(|_| {
            let keep = targets.binary_search(&i).is_err();
            i += 1;
            keep
        });
        self.rebuild_indexes()?;
        Ok(targets.len())
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    /// Whether this column is the primary key
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Self {
            name: name.into(),
            datatype,
            primary_key: false,
            unique: false,
            nullable: true,
        }
    }

    /// Primary keys are implicitly unique
    pub fn is_unique(&self) -> bool {
        self.primary_key || self.unique
    }

    /// Primary keys never accept NULL, whatever their declared nullability
    pub fn accepts_null(&self) -> bool {
        self.nullable && !self.primary_key
    }

    /// Checks a value against the column and returns it in stored form.
    ///
    /// FLOAT columns widen integers; every other type requires an exact match.
    pub fn validate(&self, value: Value) -> Result<Value> {
        match (self.datatype, value) {
            (_, Value::Null) if self.accepts_null() => Ok(Value::Null),
            (_, Value::Null) => Err(Error::NullViolation(self.name.clone())),
            (DataType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (datatype, value) if value.datatype() == Some(datatype) => Ok(value),
            (datatype, value) => Err(Error::TypeMismatch {
                column: self.name.clone(),
                expected: datatype,
                value,
            }),
        }
    }
}
