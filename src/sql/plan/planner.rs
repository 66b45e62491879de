use crate::{
    error::{Error, Result},
    sql::{
        parser::ast,
        plan::{Node, Plan},
        schema::{self, Table},
        types::Value,
    },
};

/// Query planner - converts AST into execution plan nodes
///
/// Placeholders are substituted here in a single pass: each `?` becomes the
/// bound parameter at its position, as a typed value. Parameters are never
/// spliced back into SQL text.
pub struct Planner<'a> {
    params: &'a [Value],
}

impl<'a> Planner<'a> {
    pub fn new(params: &'a [Value]) -> Self {
        Self { params }
    }

    /// Builds an execution plan from an AST statement
    pub fn build(&mut self, stmt: ast::Statement) -> Result<Plan> {
        let expected = stmt.placeholders();
        if self.params.len() < expected {
            return Err(Error::ParameterMismatch {
                expected,
                provided: self.params.len(),
            });
        }
        Ok(Plan(self.build_statement(stmt)?))
    }

    pub fn build_statement(&self, stmt: ast::Statement) -> Result<Node> {
        Ok(match stmt {
            ast::Statement::CreateTable { name, columns } => Node::CreateTable {
                schema: Table::new(
                    name,
                    columns
                        .into_iter()
                        .map(|c| schema::Column {
                            name: c.name,
                            datatype: c.datatype,
                            primary_key: c.primary_key,
                            unique: c.unique,
                            nullable: c.nullable.unwrap_or(true),
                        })
                        .collect(),
                ),
            },
            ast::Statement::CreateIndex {
                name,
                table_name,
                column,
            } => Node::CreateIndex {
                name,
                table_name,
                column,
            },
            ast::Statement::Insert {
                table_name,
                columns,
                values,
            } => Node::Insert {
                table_name,
                columns: columns.unwrap_or_default(),
                values: values
                    .into_iter()
                    .map(|e| self.bind(e))
                    .collect::<Result<Vec<_>>>()?,
            },
            ast::Statement::Select {
                select,
                from,
                join,
                where_clause,
                limit,
            } => {
                let predicate = self.bind_where(where_clause)?;

                // Without a join the filter is pushed into the scan, which
                // can answer it from a hash index
                let mut node = match join {
                    None => Node::Scan {
                        table_name: from,
                        filter: predicate,
                    },
                    Some(join) => {
                        let node = Node::NestedLoopJoin {
                            left: Box::new(Node::Scan {
                                table_name: from,
                                filter: None,
                            }),
                            right: Box::new(Node::Scan {
                                table_name: join.table,
                                filter: None,
                            }),
                            predicate: (join.left, join.right),
                            outer: join.join_type == ast::JoinType::Left,
                        };
                        match predicate {
                            Some(predicate) => Node::Filter {
                                source: Box::new(node),
                                predicate,
                            },
                            None => node,
                        }
                    }
                };

                // projection
                if !select.is_empty() {
                    node = Node::Projection {
                        source: Box::new(node),
                        columns: select,
                    }
                }

                // LIMIT
                if let Some(limit) = limit {
                    node = Node::Limit {
                        source: Box::new(node),
                        limit,
                    }
                }

                node
            }
            ast::Statement::Update {
                table_name,
                columns,
                where_clause,
            } => Node::Update {
                table_name,
                filter: self.bind_where(where_clause)?,
                columns: columns
                    .into_iter()
                    .map(|(col, e)| -> Result<(String, Value)> { Ok((col, self.bind(e)?)) })
                    .collect::<Result<_>>()?,
            },
            ast::Statement::Delete {
                table_name,
                where_clause,
            } => Node::Delete {
                table_name,
                filter: self.bind_where(where_clause)?,
            },
        })
    }

    /// Resolves a value slot to a literal
    fn bind(&self, expr: ast::Expression) -> Result<Value> {
        match expr {
            ast::Expression::Consts(c) => Ok(Value::from_consts(c)),
            ast::Expression::Placeholder(i) => {
                self.params
                    .get(i)
                    .cloned()
                    .ok_or(Error::ParameterMismatch {
                        expected: i + 1,
                        provided: self.params.len(),
                    })
            }
        }
    }

    fn bind_where(
        &self,
        where_clause: Option<(String, ast::Expression)>,
    ) -> Result<Option<(String, Value)>> {
        where_clause
            .map(|(col, e)| -> Result<(String, Value)> { Ok((col, self.bind(e)?)) })
            .transpose()
    }
}
