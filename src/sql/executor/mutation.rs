use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        engine::Catalog,
        executor::ResultSet,
        schema::Table,
        types::{Row, Value},
    },
};

use super::Executor;

/// INSERT executor
pub struct Insert {
    table_name: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Insert {
    pub fn new(table_name: String, columns: Vec<String>, values: Vec<Value>) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            values,
        })
    }
}

// Insert with a column list:
// insert into tbl(d, b) values(1, 2);
//   a      b      c      d
//  NULL    2     NULL    1
fn make_row(table: &Table, columns: &[String], values: Vec<Value>) -> Result<Row> {
    if columns.len() != values.len() {
        return Err(Error::Arity {
            expected: columns.len(),
            found: values.len(),
        });
    }

    let mut inputs = HashMap::new();
    for (col_name, value) in columns.iter().zip(values) {
        table.get_col_index(col_name)?;
        inputs.insert(col_name.as_str(), value);
    }

    Ok(table
        .columns
        .iter()
        .map(|col| inputs.remove(col.name.as_str()).unwrap_or(Value::Null))
        .collect())
}

impl<C: Catalog> Executor<C> for Insert {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        // Positional inserts are checked for arity by the table itself
        let row = if self.columns.is_empty() {
            self.values
        } else {
            make_row(table, &self.columns, self.values)?
        };

        debug!(table = %self.table_name, row = ?row, "insert row");
        table.add_row(row)?;
        catalog.save_table(&self.table_name)?;
        Ok(ResultSet::Insert)
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    filter: Option<(String, Value)>,
    columns: BTreeMap<String, Value>,
}

impl Update {
    pub fn new(
        table_name: String,
        filter: Option<(String, Value)>,
        columns: BTreeMap<String, Value>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            filter,
            columns,
        })
    }
}

impl<C: Catalog> Executor<C> for Update {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        let count = table.update_rows(self.filter.as_ref(), &self.columns)?;
        if count > 0 {
            catalog.save_table(&self.table_name)?;
        }
        Ok(ResultSet::Update { count })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    filter: Option<(String, Value)>,
}

impl Delete {
    pub fn new(table_name: String, filter: Option<(String, Value)>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl<C: Catalog> Executor<C> for Delete {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        let count = table.delete_rows(self.filter.as_ref())?;
        if count > 0 {
            catalog.save_table(&self.table_name)?;
        }
        Ok(ResultSet::Delete { count })
    }
}
