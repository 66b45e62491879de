use tracing::info;

use crate::{
    error::Result,
    sql::{engine::Catalog, executor::Executor, schema::Table},
};

use super::ResultSet;

/// CREATE TABLE executor
pub struct CreateTable {
    schema: Table,
}

impl CreateTable {
    pub fn new(schema: Table) -> Box<Self> {
        Box::new(Self { schema })
    }
}

impl<C: Catalog> Executor<C> for CreateTable {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        self.schema.validate()?;
        let table_name = self.schema.name.clone();
        catalog.create_table(self.schema)?;
        info!(table = %table_name, "created table");
        Ok(ResultSet::CreateTable { table_name })
    }
}

/// CREATE INDEX executor - builds a hash index from the table's current rows
pub struct CreateIndex {
    name: String,
    table_name: String,
    column: String,
}

impl CreateIndex {
    pub fn new(name: String, table_name: String, column: String) -> Box<Self> {
        Box::new(Self {
            name,
            table_name,
            column,
        })
    }
}

impl<C: Catalog> Executor<C> for CreateIndex {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let table = catalog.must_get_table_mut(&self.table_name)?;
        table.create_index(self.name.clone(), &self.column)?;
        catalog.save_table(&self.table_name)?;
        Ok(ResultSet::CreateIndex {
            index_name: self.name,
            table_name: self.table_name,
            column: self.column,
        })
    }
}
