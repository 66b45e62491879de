use std::collections::BTreeMap;
use std::iter::Peekable;
use ast::Column;
use crate::sql::parser::ast::Expression;
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use crate::error::{Result, Error};
use super::types::DataType;

pub mod ast;
mod lexer;

/// SQL Parser - Converts tokens into Abstract Syntax Tree (AST)
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
    /// Placeholders seen so far, used to number the next one
    placeholders: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input).peekable(),
            placeholders: 0,
        }
    }

    /// Parses the input SQL statement into an AST
    pub fn parse(&mut self) -> Result<ast::Statement> {
        let stmt = self.parse_statement()?;
        self.next_if_token(Token::Semicolon);
        // No tokens allowed after the statement
        if let Some(token) = self.peek()? {
            return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
        }
        Ok(stmt)
    }

    /// Parses a statement based on the first token
    fn parse_statement(&mut self) -> Result<ast::Statement> {
        match self.peek()? {
            Some(Token::Keyword(Keyword::Create)) => self.parse_ddl(),
            Some(Token::Keyword(Keyword::Select)) => self.parse_select(),
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert(),
            Some(Token::Keyword(Keyword::Update)) => self.parse_update(),
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete(),
            Some(t) => Err(Error::Parse(format!("[Parser] Unexpected token {}", t))),
            None => Err(Error::Parse("[Parser] Unexpected end of input".to_string())),
        }
    }

    /// Parses DDL statements (CREATE TABLE, CREATE INDEX)
    fn parse_ddl(&mut self) -> Result<ast::Statement> {
        match self.next()? {
            Token::Keyword(Keyword::Create) => match self.next()? {
                Token::Keyword(Keyword::Table) => self.parse_ddl_create_table(),
                Token::Keyword(Keyword::Index) => self.parse_ddl_create_index(),
                token => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
            },
            token => Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
        }
    }

    /// Parses CREATE TABLE statement
    fn parse_ddl_create_table(&mut self) -> Result<ast::Statement> {
        let table_name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns: Vec<Column> = Vec::new();
        loop {
            let column = self.parse_ddl_column()?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(Error::Parse(format!(
                    "[Parser] Duplicate column {} in table {}",
                    column.name, table_name
                )));
            }
            columns.push(column);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        Ok(ast::Statement::CreateTable { name: table_name, columns })
    }

    /// Parses column definition in CREATE TABLE
    fn parse_ddl_column(&mut self) -> Result<ast::Column> {
        let mut column = Column {
            name: self.next_ident()?,
            datatype: match self.next()? {
                Token::Keyword(Keyword::Int) | Token::Keyword(Keyword::Integer) => DataType::Integer,
                Token::Keyword(Keyword::Bool) | Token::Keyword(Keyword::Boolean) => DataType::Boolean,
                Token::Keyword(Keyword::Float) | Token::Keyword(Keyword::Double) | Token::Keyword(Keyword::Real) => DataType::Float,
                Token::Keyword(Keyword::String) | Token::Keyword(Keyword::Text) => DataType::Text,
                Token::Keyword(Keyword::Varchar) => {
                    // VARCHAR(n): the length is accepted and ignored
                    if self.next_if_token(Token::OpenParen).is_some() {
                        match self.next()? {
                            Token::Number(_) => {}
                            token => return Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
                        }
                        self.next_expect(Token::CloseParen)?;
                    }
                    DataType::Text
                }
                token => return Err(Error::Parse(format!("[Parser] Unexpected token {}", token))),
            },
            nullable: None,
            primary_key: false,
            unique: false,
        };

        // Parse column constraints (PRIMARY KEY, UNIQUE, NULL, NOT NULL)
        while let Some(Token::Keyword(keyword)) = self.next_if_keyword() {
            match keyword {
                Keyword::Null => column.nullable = Some(true),
                Keyword::Not => {
                    self.next_expect(Token::Keyword(Keyword::Null))?;
                    column.nullable = Some(false);
                }
                Keyword::Primary => {
                    self.next_expect(Token::Keyword(Keyword::Key))?;
                    column.primary_key = true;
                }
                Keyword::Unique => column.unique = true,
                k => return Err(Error::Parse(format!("[Parser] Unexpected keyword {}", k))),
            }
        }

        Ok(column)
    }

    /// Parses CREATE INDEX <name> ON <table>(<column>)
    fn parse_ddl_create_index(&mut self) -> Result<ast::Statement> {
        let name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::On))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;
        let column = self.next_ident()?;
        self.next_expect(Token::CloseParen)?;
        Ok(ast::Statement::CreateIndex { name, table_name, column })
    }

    /// Parses SELECT statement
    fn parse_select(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Select))?;

        let mut select = Vec::new();
        if self.next_if_token(Token::Asterisk).is_none() {
            loop {
                select.push(self.next_ident()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
        }
        self.next_expect(Token::Keyword(Keyword::From))?;
        let from = self.next_ident()?;

        Ok(ast::Statement::Select {
            select,
            from,
            join: self.parse_join_clause()?,
            where_clause: self.parse_where_clause()?,
            limit: self.parse_limit_clause()?,
        })
    }

    /// Parses an optional `[INNER | LEFT [OUTER]] JOIN <table> ON <a> = <b>`
    fn parse_join_clause(&mut self) -> Result<Option<ast::Join>> {
        let join_type = if self.next_if_token(Token::Keyword(Keyword::Join)).is_some() {
            ast::JoinType::Inner
        } else if self.next_if_token(Token::Keyword(Keyword::Inner)).is_some() {
            self.next_expect(Token::Keyword(Keyword::Join))?;
            ast::JoinType::Inner
        } else if self.next_if_token(Token::Keyword(Keyword::Left)).is_some() {
            self.next_if_token(Token::Keyword(Keyword::Outer));
            self.next_expect(Token::Keyword(Keyword::Join))?;
            ast::JoinType::Left
        } else {
            return Ok(None);
        };

        let table = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::On))?;
        let left = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let right = self.next_ident()?;
        Ok(Some(ast::Join { table, join_type, left, right }))
    }

    /// Parses an optional `LIMIT <n>`
    fn parse_limit_clause(&mut self) -> Result<Option<usize>> {
        if self.next_if_token(Token::Keyword(Keyword::Limit)).is_none() {
            return Ok(None);
        }
        match self.next()? {
            Token::Number(n) if n.chars().all(|c| c.is_ascii_digit()) => Ok(Some(n.parse()?)),
            token => Err(Error::Parse(format!(
                "[Parser] Expected row count after LIMIT, got {}",
                token
            ))),
        }
    }

    /// Parses INSERT statement
    fn parse_insert(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Insert))?;
        self.next_expect(Token::Keyword(Keyword::Into))?;

        let table_name = self.next_ident()?;

        // Check if specific columns are specified
        let columns = if self.next_if_token(Token::OpenParen).is_some() {
            let mut cols = Vec::new();
            loop {
                let col = self.next_ident()?;
                if cols.contains(&col) {
                    return Err(Error::Parse(format!(
                        "[Parser] Duplicate column {} in insert",
                        col
                    )));
                }
                cols.push(col);
                match self.next()? {
                    Token::CloseParen => break,
                    Token::Comma => {}
                    token => {
                        return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
                    }
                }
            }
            Some(cols)
        } else {
            None
        };

        self.next_expect(Token::Keyword(Keyword::Values))?;
        self.next_expect(Token::OpenParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_expression()?);
            match self.next()? {
                Token::CloseParen => break,
                Token::Comma => {}
                token => {
                    return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
                }
            }
        }
        Ok(ast::Statement::Insert {
            table_name,
            columns,
            values,
        })
    }

    /// Parses UPDATE statement
    fn parse_update(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Update))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let mut columns = BTreeMap::new();
        loop {
            let col = self.next_ident()?;
            self.next_expect(Token::Equal)?;
            let value = self.parse_expression()?;
            // Assigning the same column twice is ambiguous
            if columns.contains_key(&col) {
                return Err(Error::Parse(format!(
                    "[Parser] Duplicate column {} for update",
                    col
                )));
            }
            columns.insert(col, value);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        Ok(ast::Statement::Update {
            table_name,
            columns,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE FROM statement
    fn parse_delete(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Delete))?;
        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        Ok(ast::Statement::Delete {
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses a value slot: a literal or a `?` placeholder
    fn parse_expression(&mut self) -> Result<ast::Expression> {
        Ok(match self.next()? {
            Token::Number(n) => Self::parse_number(&n, false)?,
            Token::Minus => match self.next()? {
                Token::Number(n) => Self::parse_number(&n, true)?,
                t => {
                    return Err(Error::Parse(format!(
                        "[Parser] Expected number after -, got {}",
                        t
                    )))
                }
            },
            Token::String(s) => ast::Consts::String(s).into(),
            Token::Keyword(Keyword::True) => ast::Consts::Boolean(true).into(),
            Token::Keyword(Keyword::False) => ast::Consts::Boolean(false).into(),
            Token::Keyword(Keyword::Null) => ast::Consts::Null.into(),
            Token::Question => {
                self.placeholders += 1;
                ast::Expression::Placeholder(self.placeholders - 1)
            }
            t => {
                return Err(Error::Parse(format!(
                    "[Parser] Unexpected expression token {}",
                    t
                )))
            }
        })
    }

    /// The lexer scans both 123 and 123.45 as Token::Number, the dot decides the type
    fn parse_number(n: &str, negative: bool) -> Result<ast::Expression> {
        let text = if negative { format!("-{}", n) } else { n.to_string() };
        if n.chars().all(|c| c.is_ascii_digit()) {
            Ok(ast::Consts::Integer(text.parse()?).into())
        } else {
            Ok(ast::Consts::Float(text.parse()?).into())
        }
    }

    /// Parses an optional WHERE clause: column_name = expr
    fn parse_where_clause(&mut self) -> Result<Option<(String, Expression)>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        let col = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let val = self.parse_expression()?;
        Ok(Some((col, val)))
    }

    /// Peeks at the next token
    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .unwrap_or_else(|| Err(Error::Parse("[Parser] Unexpected end of input".to_string())))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Parse(format!(
                "[Parser] Expected ident, got token {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Parse(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it satisfies the predicate
    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.peek().unwrap_or(None).filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consumes next token if it's a keyword
    fn next_if_keyword(&mut self) -> Option<Token> {
        self.next_if(|t| matches!(t, Token::Keyword(_)))
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        error::{Error, Result},
        sql::{parser::ast, types::DataType},
    };

    use super::Parser;

    #[test]
    fn test_parser_create_table() -> Result<()> {
        let sql1 = "
            create table users (
                id integer primary key,
                name text not null,
                email varchar(64) unique,
                score float null,
                active bool
            );
        ";
        let stmt1 = Parser::new(sql1).parse()?;

        let sql2 = "CREATE   TABLE users(id INTEGER PRIMARY KEY, name TEXT NOT NULL, email VARCHAR UNIQUE, score DOUBLE NULL, active BOOLEAN)";
        let stmt2 = Parser::new(sql2).parse()?;
        assert_eq!(stmt1, stmt2);

        match stmt1 {
            ast::Statement::CreateTable { name, columns } => {
                assert_eq!(name, "users");
                assert_eq!(columns.len(), 5);
                assert!(columns[0].primary_key);
                assert_eq!(columns[1].nullable, Some(false));
                assert!(columns[2].unique);
                assert_eq!(columns[2].datatype, DataType::Text);
                assert_eq!(columns[3].nullable, Some(true));
                assert_eq!(columns[4].datatype, DataType::Boolean);
            }
            other => panic!("unexpected statement {:?}", other),
        }

        assert!(Parser::new("create table t (a int, a text)").parse().is_err());
        assert!(Parser::new("create table t (a blob)").parse().is_err());
        assert!(Parser::new("create table t (a int").parse().is_err());
        Ok(())
    }

    #[test]
    fn test_parser_create_index() -> Result<()> {
        let stmt = Parser::new("CREATE INDEX idx_name ON users(name);").parse()?;
        assert_eq!(
            stmt,
            ast::Statement::CreateIndex {
                name: "idx_name".to_string(),
                table_name: "users".to_string(),
                column: "name".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_insert() -> Result<()> {
        let stmt1 = Parser::new("insert into tbl1 values (1, -2, 3.5, 'a', true, null);").parse()?;
        assert_eq!(
            stmt1,
            ast::Statement::Insert {
                table_name: "tbl1".to_string(),
                columns: None,
                values: vec![
                    ast::Consts::Integer(1).into(),
                    ast::Consts::Integer(-2).into(),
                    ast::Consts::Float(3.5).into(),
                    ast::Consts::String("a".to_string()).into(),
                    ast::Consts::Boolean(true).into(),
                    ast::Consts::Null.into(),
                ],
            }
        );

        let stmt2 = Parser::new("INSERT INTO tbl2 (c1, c2) VALUES (?, ?)").parse()?;
        assert_eq!(
            stmt2,
            ast::Statement::Insert {
                table_name: "tbl2".to_string(),
                columns: Some(vec!["c1".to_string(), "c2".to_string()]),
                values: vec![
                    ast::Expression::Placeholder(0),
                    ast::Expression::Placeholder(1),
                ],
            }
        );
        assert_eq!(stmt2.placeholders(), 2);
        Ok(())
    }

    #[test]
    fn test_parser_select() -> Result<()> {
        let stmt = Parser::new("select * from tbl1;").parse()?;
        assert_eq!(
            stmt,
            ast::Statement::Select {
                select: vec![],
                from: "tbl1".to_string(),
                join: None,
                where_clause: None,
                limit: None,
            }
        );

        let stmt = Parser::new(
            "SELECT name, title FROM authors LEFT OUTER JOIN books ON id = author_id WHERE name = ? LIMIT 10",
        )
        .parse()?;
        assert_eq!(
            stmt,
            ast::Statement::Select {
                select: vec!["name".to_string(), "title".to_string()],
                from: "authors".to_string(),
                join: Some(ast::Join {
                    table: "books".to_string(),
                    join_type: ast::JoinType::Left,
                    left: "id".to_string(),
                    right: "author_id".to_string(),
                }),
                where_clause: Some(("name".to_string(), ast::Expression::Placeholder(0))),
                limit: Some(10),
            }
        );

        let stmt = Parser::new("select a from t inner join u on a = b").parse()?;
        assert!(matches!(
            stmt,
            ast::Statement::Select { join: Some(ast::Join { join_type: ast::JoinType::Inner, .. }), .. }
        ));
        Ok(())
    }

    #[test]
    fn test_parser_update_delete() -> Result<()> {
        let stmt = Parser::new("UPDATE users SET name = ?, age = 3 WHERE id = ?").parse()?;
        let mut columns = BTreeMap::new();
        columns.insert("name".to_string(), ast::Expression::Placeholder(0));
        columns.insert("age".to_string(), ast::Consts::Integer(3).into());
        assert_eq!(
            stmt,
            ast::Statement::Update {
                table_name: "users".to_string(),
                columns,
                where_clause: Some(("id".to_string(), ast::Expression::Placeholder(1))),
            }
        );
        assert_eq!(stmt.placeholders(), 2);

        assert!(Parser::new("update t set a = 1, a = 2").parse().is_err());

        let stmt = Parser::new("DELETE FROM users").parse()?;
        assert_eq!(
            stmt,
            ast::Statement::Delete {
                table_name: "users".to_string(),
                where_clause: None,
            }
        );
        Ok(())
    }

    #[test]
    fn test_parser_errors() {
        let err = Parser::new("SELECT * FROM users WHERE").parse().unwrap_err();
        assert_eq!(err, Error::Parse("[Parser] Unexpected end of input".to_string()));

        let err = Parser::new("DROP TABLE users").parse().unwrap_err();
        assert!(err.to_string().contains("DROP"));

        let err = Parser::new("SELECT * FROM users LIMIT 'x'").parse().unwrap_err();
        assert!(err.to_string().contains("'x'"));

        assert!(Parser::new("SELECT * FROM users WHERE a = 1 AND b = 2").parse().is_err());
        assert!(Parser::new("select * from t; select * from t").parse().is_err());
        assert!(Parser::new("").parse().is_err());
    }
}
