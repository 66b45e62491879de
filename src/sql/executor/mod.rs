use std::fmt::Display;

use crate::{
    error::Result,
    sql::{
        engine::Catalog,
        executor::{
            join::NestedLoopJoin,
            mutation::{Delete, Insert, Update},
            query::{Filter, Limit, Projection, Scan},
            schema::{CreateIndex, CreateTable},
        },
        plan::Node,
        types::{Row, Value},
    },
};

mod join;
mod mutation;
mod query;
mod schema;

/// SQL executor trait
pub trait Executor<C: Catalog> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet>;
}

/// Builds an executor from a plan node
///
/// The `'static` bound is required for trait object usage in recursive executor building.
impl<C: Catalog + 'static> dyn Executor<C> {
    pub fn build(node: Node) -> Box<dyn Executor<C>> {
        match node {
            Node::CreateTable { schema } => CreateTable::new(schema),
            Node::CreateIndex {
                name,
                table_name,
                column,
            } => CreateIndex::new(name, table_name, column),
            Node::Insert {
                table_name,
                columns,
                values,
            } => Insert::new(table_name, columns, values),
            Node::Scan { table_name, filter } => Scan::new(table_name, filter),
            Node::NestedLoopJoin {
                left,
                right,
                predicate,
                outer,
            } => NestedLoopJoin::new(Self::build(*left), Self::build(*right), predicate, outer),
            Node::Filter { source, predicate } => Filter::new(Self::build(*source), predicate),
            Node::Projection { source, columns } => Projection::new(Self::build(*source), columns),
            Node::Limit { source, limit } => Limit::new(Self::build(*source), limit),
            Node::Update {
                table_name,
                filter,
                columns,
            } => Update::new(table_name, filter, columns),
            Node::Delete { table_name, filter } => Delete::new(table_name, filter),
        }
    }
}

/// Execution result set
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    CreateTable {
        table_name: String,
    },
    CreateIndex {
        index_name: String,
        table_name: String,
        column: String,
    },
    /// A single row was appended
    Insert,
    /// Rows of a SELECT; each row maps `columns[i]` to `row[i]`
    Scan {
        columns: Vec<String>,
        rows: Vec<Row>,
    },
    Update {
        count: usize,
    },
    Delete {
        count: usize,
    },
}

impl ResultSet {
    /// Result rows, empty for non-query statements
    pub fn rows(&self) -> &[Row] {
        match self {
            ResultSet::Scan { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            ResultSet::Scan { columns, .. } => columns,
            _ => &[],
        }
    }

    /// Looks up a cell by row number and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let pos = self.columns().iter().position(|c| c == column)?;
        self.rows().get(row).map(|r| &r[pos])
    }
}

/// Human-readable status line for each statement kind
impl Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultSet::CreateTable { table_name } => write!(f, "Table '{}' created.", table_name),
            ResultSet::CreateIndex {
                index_name,
                table_name,
                column,
            } => write!(
                f,
                "Index '{}' created on {}({}).",
                index_name, table_name, column
            ),
            ResultSet::Insert => write!(f, "1 row inserted."),
            ResultSet::Scan { rows, .. } => write!(f, "{} row(s) selected.", rows.len()),
            ResultSet::Update { count } => write!(f, "{} row(s) updated.", count),
            ResultSet::Delete { count } => write!(f, "{} row(s) deleted.", count),
        }
    }
}
