use std::collections::BTreeMap;

use crate::{
    error::Result,
    sql::{
        engine::Catalog,
        executor::{Executor, ResultSet},
        parser::ast,
        schema::Table,
        types::Value,
    },
};

mod planner;

pub use planner::Planner;

/// Execution plan node
///
/// Every value slot holds a bound `Value`: placeholders are resolved by the
/// planner, so executors never see parameters.
#[derive(Debug, PartialEq)]
pub enum Node {
    CreateTable {
        schema: Table,
    },
    CreateIndex {
        name: String,
        table_name: String,
        column: String,
    },
    Insert {
        table_name: String,
        /// Target columns, empty for positional insert
        columns: Vec<String>,
        values: Vec<Value>,
    },
    /// Reads a table, optionally keeping only rows where `column = value`
    Scan {
        table_name: String,
        filter: Option<(String, Value)>,
    },
    NestedLoopJoin {
        left: Box<Node>,
        right: Box<Node>,
        /// `ON left = right`, column names as written
        predicate: (String, String),
        outer: bool,
    },
    Filter {
        source: Box<Node>,
        predicate: (String, Value),
    },
    Projection {
        source: Box<Node>,
        columns: Vec<String>,
    },
    Limit {
        source: Box<Node>,
        limit: usize,
    },
    Update {
        table_name: String,
        filter: Option<(String, Value)>,
        columns: BTreeMap<String, Value>,
    },
    Delete {
        table_name: String,
        filter: Option<(String, Value)>,
    },
}

/// Execution plan for a single statement
#[derive(Debug, PartialEq)]
pub struct Plan(pub Node);

impl Plan {
    /// Builds a plan from a statement, binding `params` to its placeholders
    pub fn build(stmt: ast::Statement, params: &[Value]) -> Result<Self> {
        Planner::new(params).build(stmt)
    }

    /// Runs the plan against the catalog
    pub fn execute<C: Catalog + 'static>(self, catalog: &mut C) -> Result<ResultSet> {
        <dyn Executor<C>>::build(self.0).execute(catalog)
    }
}
