use std::collections::BTreeMap;

use crate::sql::types::DataType;

/// Abstract Syntax Tree (AST) node definitions for SQL statements
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// CREATE INDEX statement
    CreateIndex {
        name: String,
        table_name: String,
        column: String,
    },
    /// INSERT statement
    Insert {
        table_name: String,
        columns: Option<Vec<String>>,
        values: Vec<Expression>,
    },
    /// SELECT statement
    Select {
        /// Projected column names, empty for `*`
        select: Vec<String>,
        from: String,
        join: Option<Join>,
        where_clause: Option<(String, Expression)>,
        limit: Option<usize>,
    },
    /// UPDATE statement
    Update {
        table_name: String,
        columns: BTreeMap<String, Expression>,
        where_clause: Option<(String, Expression)>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<(String, Expression)>,
    },
}

impl Statement {
    /// Number of `?` placeholders the statement needs bound
    pub fn placeholders(&self) -> usize {
        fn count<'a>(exprs: impl IntoIterator<Item = &'a Expression>) -> usize {
            exprs
                .into_iter()
                .filter(|e| matches!(e, Expression::Placeholder(_)))
                .count()
        }
        match self {
            Statement::CreateTable { .. } | Statement::CreateIndex { .. } => 0,
            Statement::Insert { values, .. } => count(values),
            Statement::Select { where_clause, .. } | Statement::Delete { where_clause, .. } => {
                count(where_clause.iter().map(|(_, e)| e))
            }
            Statement::Update {
                columns,
                where_clause,
                ..
            } => count(columns.values().chain(where_clause.iter().map(|(_, e)| e))),
        }
    }
}

/// JOIN clause: `[LEFT] JOIN <table> ON <left> = <right>`
#[derive(Debug, PartialEq)]
pub struct Join {
    pub table: String,
    pub join_type: JoinType,
    pub left: String,
    pub right: String,
}

#[derive(Debug, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
}

/// Column definition for CREATE TABLE statements
#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub nullable: Option<bool>,
    pub primary_key: bool,
    pub unique: bool,
}

/// Value slot in a statement: a literal, or a placeholder numbered in text order
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// Constant value
    Consts(Consts),
    /// `?` placeholder, the number is its zero-based position in the text
    Placeholder(usize),
}

/// Implements From trait to convert Consts into Expression
impl From<Consts> for Expression {
    fn from(value: Consts) -> Self {
        Self::Consts(value)
    }
}

/// Constant values in SQL expressions
#[derive(Debug, PartialEq, Clone)]
pub enum Consts {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}
