//! Database facade.
//!
//! The single entry point used by shells and front ends: statements go in as
//! SQL text plus bound parameters, results come back either structured
//! (`execute`) or already rendered (`run`).

use std::fmt::Display;

use tracing::info;

use crate::{
    config::Config,
    error::Result,
    sql::{
        engine::{Engine, local::LocalEngine},
        executor::ResultSet,
        schema::Table,
        types::{Row, Value},
    },
    storage::{disk::DiskEngine, engine::Engine as StorageEngine, memory::MemoryEngine},
};

/// Prefix of every status line that reports a failed statement
pub const ERROR_MARKER: &str = "Error: ";

/// A database handle. Cloning it shares the same catalog.
pub struct Database<E: StorageEngine + 'static = DiskEngine> {
    engine: LocalEngine<E>,
}

impl<E: StorageEngine + 'static> Clone for Database<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl Database<DiskEngine> {
    /// Opens the data directory from `config`, loading every table in it
    pub fn open(config: &Config) -> Result<Self> {
        info!(data_dir = %config.data_dir.display(), "opening database");
        Self::with_engine(DiskEngine::new(&config.data_dir)?)
    }
}

impl Database<MemoryEngine> {
    /// A database whose snapshots never leave the process
    pub fn in_memory() -> Result<Self> {
        Self::with_engine(MemoryEngine::new())
    }
}

impl<E: StorageEngine + 'static> Database<E> {
    pub fn with_engine(engine: E) -> Result<Self> {
        Ok(Self {
            engine: LocalEngine::new(engine)?,
        })
    }

    /// Executes one statement, binding `params` to its `?` placeholders in order
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.engine.session()?.execute(sql, params)
    }

    /// Executes one statement and renders the outcome; never fails
    pub fn run(&self, sql: &str, params: &[Value]) -> Output {
        self.execute(sql, params).into()
    }

    /// Table names in creation order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.engine.catalog()?.list_tables())
    }

    /// A copy of the table (schema and rows), if it exists
    pub fn get_table(&self, table_name: &str) -> Result<Option<Table>> {
        Ok(self.engine.catalog()?.get_table(table_name).cloned())
    }
}

/// Rendered statement outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// SELECT result; `rows[i][j]` is the value of `columns[j]`
    Rows { columns: Vec<String>, rows: Vec<Row> },
    /// Acknowledgement, or an error message starting with `ERROR_MARKER`
    Status(String),
}

impl Output {
    pub fn is_error(&self) -> bool {
        matches!(self, Output::Status(s) if s.starts_with(ERROR_MARKER))
    }
}

impl From<Result<ResultSet>> for Output {
    fn from(result: Result<ResultSet>) -> Self {
        match result {
            Ok(ResultSet::Scan { columns, rows }) => Output::Rows { columns, rows },
            Ok(rs) => Output::Status(rs.to_string()),
            Err(err) => Output::Status(format!("{}{}", ERROR_MARKER, err)),
        }
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Status(s) => write!(f, "{}", s),
            Output::Rows { columns, rows } => {
                write!(f, "{}", columns.join(" | "))?;
                for row in rows {
                    let cells = row.iter().map(|v| v.to_string()).collect::<Vec<_>>();
                    write!(f, "\n{}", cells.join(" | "))?;
                }
                Ok(())
            }
        }
    }
}
