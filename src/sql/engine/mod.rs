use std::sync::MutexGuard;

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::types::Value,
};

use super::{executor::ResultSet, parser::Parser, plan::Plan, schema::Table};

pub mod local;

/// SQL engine trait
///
/// A cheap, cloneable handle. Every statement runs while holding the
/// catalog guard, so statements are serialized.
pub trait Engine: Clone {
    type Catalog: Catalog + 'static;

    fn catalog(&self) -> Result<MutexGuard<'_, Self::Catalog>>;

    fn session(&self) -> Result<Session<Self>> {
        Ok(Session {
            engine: self.clone(),
        })
    }
}

/// Table catalog trait (what executors need from storage)
pub trait Catalog {
    /// Registers a new table and persists it, errors if the name is taken
    fn create_table(&mut self, table: Table) -> Result<()>;
    fn get_table(&self, table_name: &str) -> Option<&Table>;
    fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table>;
    /// Persists the current state of a table
    fn save_table(&mut self, table_name: &str) -> Result<()>;
    /// Table names in creation order
    fn list_tables(&self) -> Vec<String>;

    /// Returns table info, returns error if table doesn't exist
    fn must_get_table(&self, table_name: &str) -> Result<&Table> {
        self.get_table(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    fn must_get_table_mut(&mut self, table_name: &str) -> Result<&mut Table> {
        self.get_table_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }
}

/// SQL session for executing statements
pub struct Session<E: Engine> {
    engine: E,
}

impl<E: Engine + 'static> Session<E> {
    /// Executes a SQL statement, binding `params` to its `?` placeholders
    pub fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        let stmt = Parser::new(sql).parse()?;
        let plan = Plan::build(stmt, params)?;
        let mut catalog = self.engine.catalog()?;
        let result = plan.execute(&mut *catalog);
        match &result {
            Ok(rs) => debug!(sql, result = %rs, "statement executed"),
            Err(err) => debug!(sql, error = %err, "statement failed"),
        }
        result
    }
}
