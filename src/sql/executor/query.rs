use crate::{
    error::{Error, Result},
    sql::{engine::Catalog, executor::ResultSet, types::Value},
};

use super::Executor;

/// Table scan executor (SELECT)
///
/// An equality filter on an indexed column is answered from the index,
/// otherwise every row is tested.
pub struct Scan {
    table_name: String,
    filter: Option<(String, Value)>,
}

impl Scan {
    pub fn new(table_name: String, filter: Option<(String, Value)>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl<C: Catalog> Executor<C> for Scan {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let table = catalog.must_get_table(&self.table_name)?;
        let rows = match &self.filter {
            Some((column, value)) => table
                .find_rows(column, value)?
                .into_iter()
                .map(|i| table.rows[i].clone())
                .collect(),
            None => table.rows.clone(),
        };
        Ok(ResultSet::Scan {
            columns: table.column_names(),
            rows,
        })
    }
}

/// WHERE executor over a joined row set
pub struct Filter<C: Catalog> {
    source: Box<dyn Executor<C>>,
    predicate: (String, Value),
}

impl<C: Catalog> Filter<C> {
    pub fn new(source: Box<dyn Executor<C>>, predicate: (String, Value)) -> Box<Self> {
        Box::new(Self { source, predicate })
    }
}

impl<C: Catalog> Executor<C> for Filter<C> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        match self.source.execute(catalog)? {
            ResultSet::Scan { columns, mut rows } => {
                let (name, value) = &self.predicate;
                let pos = columns
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| Error::ColumnNotFound(name.clone()))?;
                rows.retain(|row| row[pos].matches(value));
                Ok(ResultSet::Scan { columns, rows })
            }
            _ => Err(Error::Internal("Unexpected result set".into())),
        }
    }
}

/// Projection executor - keeps the requested columns in the requested order
pub struct Projection<C: Catalog> {
    source: Box<dyn Executor<C>>,
    columns: Vec<String>,
}

impl<C: Catalog> Projection<C> {
    pub fn new(source: Box<dyn Executor<C>>, columns: Vec<String>) -> Box<Self> {
        Box::new(Self { source, columns })
    }
}

impl<C: Catalog> Executor<C> for Projection<C> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        match self.source.execute(catalog)? {
            ResultSet::Scan { columns, rows } => {
                let positions = self
                    .columns
                    .iter()
                    .map(|name| {
                        columns
                            .iter()
                            .position(|c| c == name)
                            .ok_or_else(|| Error::ColumnNotFound(name.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let rows = rows
                    .into_iter()
                    .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
                    .collect();
                Ok(ResultSet::Scan {
                    columns: self.columns,
                    rows,
                })
            }
            _ => Err(Error::Internal("Unexpected result set".into())),
        }
    }
}

/// LIMIT executor - restricts the number of rows returned
pub struct Limit<C: Catalog> {
    source: Box<dyn Executor<C>>,
    limit: usize,
}

impl<C: Catalog> Limit<C> {
    pub fn new(source: Box<dyn Executor<C>>, limit: usize) -> Box<Self> {
        Box::new(Self { source, limit })
    }
}

impl<C: Catalog> Executor<C> for Limit<C> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        match self.source.execute(catalog)? {
            ResultSet::Scan { columns, rows } => Ok(ResultSet::Scan {
                columns,
                rows: rows.into_iter().take(self.limit).collect(),
            }),
            _ => Err(Error::Internal("Unexpected result set".into())),
        }
    }
}
