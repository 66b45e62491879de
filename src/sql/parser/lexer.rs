//! SQL Lexer - Tokenizes SQL input text into a stream of tokens

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Result, Error};

/// Represents a single lexical token in the SQL input
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// SQL reserved keyword
    Keyword(Keyword),
    /// Identifier such as table name or column name
    Ident(String),
    /// String literal
    String(String),
    /// Numeric literal (integer or floating-point)
    Number(String),
    /// Parameter placeholder `?`
    Question,
    /// Operators and punctuation
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
    Minus,
    /// Equal sign
    Equal,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(keyword) => f.write_str(keyword.to_str()),
            Token::Ident(ident) => f.write_str(ident),
            Token::String(v) => write!(f, "'{}'", v),
            Token::Number(n) => f.write_str(n),
            Token::Question => f.write_str("?"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Asterisk => f.write_str("*"),
            Token::Minus => f.write_str("-"),
            Token::Equal => f.write_str("="),
        }
    }
}

/// SQL reserved keywords
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    // DDL keywords
    Create,
    Table,
    Index,
    On,
    // Data type keywords
    Int,
    Integer,
    Boolean,
    Bool,
    String,
    Text,
    Varchar,
    Float,
    Double,
    Real,
    // DML keywords
    Select,
    From,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Where,
    Limit,
    Join,
    Inner,
    Left,
    Outer,
    // Literal keywords
    True,
    False,
    Not,
    Null,
    // Constraint keywords
    Primary,
    Key,
    Unique,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "INDEX" => Keyword::Index,
            "ON" => Keyword::On,
            "INT" => Keyword::Int,
            "INTEGER" => Keyword::Integer,
            "BOOLEAN" => Keyword::Boolean,
            "BOOL" => Keyword::Bool,
            "STRING" => Keyword::String,
            "TEXT" => Keyword::Text,
            "VARCHAR" => Keyword::Varchar,
            "FLOAT" => Keyword::Float,
            "DOUBLE" => Keyword::Double,
            "REAL" => Keyword::Real,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "WHERE" => Keyword::Where,
            "LIMIT" => Keyword::Limit,
            "JOIN" => Keyword::Join,
            "INNER" => Keyword::Inner,
            "LEFT" => Keyword::Left,
            "OUTER" => Keyword::Outer,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "PRIMARY" => Keyword::Primary,
            "KEY" => Keyword::Key,
            "UNIQUE" => Keyword::Unique,
            _ => return None,
        })
    }

    /// Returns the uppercase string representation of the keyword
    pub fn to_str(&self) -> &str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Index => "INDEX",
            Keyword::On => "ON",
            Keyword::Int => "INT",
            Keyword::Integer => "INTEGER",
            Keyword::Boolean => "BOOLEAN",
            Keyword::Bool => "BOOL",
            Keyword::String => "STRING",
            Keyword::Text => "TEXT",
            Keyword::Varchar => "VARCHAR",
            Keyword::Float => "FLOAT",
            Keyword::Double => "DOUBLE",
            Keyword::Real => "REAL",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Where => "WHERE",
            Keyword::Limit => "LIMIT",
            Keyword::Join => "JOIN",
            Keyword::Inner => "INNER",
            Keyword::Left => "LEFT",
            Keyword::Outer => "OUTER",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::Unique => "UNIQUE",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// SQL lexical analyzer (lexer/tokenizer)
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    /// Character offset of the next unread character
    pos: usize,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => self.iter.peek().map(|c| {
                Err(Error::Parse(format!(
                    "[Lexer] Unexpected character {} at position {}",
                    c, self.pos
                )))
            }),
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given SQL text
    pub fn new(sql_text: &'a str) -> Self {
        Self {
            iter: sql_text.chars().peekable(),
            pos: 0,
        }
    }

    /// Consumes one character, keeping track of the position
    fn bump(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        self.pos += 1;
        Some(c)
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&c| predicate(*c))?;
        self.bump()
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    /// Peeks and consumes if the character maps to a token (for single-char tokens)
    fn next_if_token<F: Fn(char) -> Option<Token>>(&mut self, predicate: F) -> Option<Token> {
        let token = self.iter.peek().and_then(|c| predicate(*c))?;
        self.bump();
        Some(token)
    }

    /// Removes whitespace from the input stream
    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Scans and returns the next token
    fn scan(&mut self) -> Result<Option<Token>> {
        self.erase_whitespace();
        match self.iter.peek() {
            Some('\'') => self.scan_string(),
            Some(c) if c.is_ascii_digit() => Ok(self.scan_number()),
            Some(c) if c.is_alphabetic() || *c == '_' => Ok(self.scan_ident()),
            Some(_) => Ok(self.scan_symbol()),
            None => Ok(None),
        }
    }

    /// Scans a string literal (enclosed in single quotes, `''` escapes a quote)
    fn scan_string(&mut self) -> Result<Option<Token>> {
        let start = self.pos;
        self.bump();
        let mut val = String::new();

        loop {
            match self.bump() {
                Some('\'') if self.next_if(|c| c == '\'').is_some() => val.push('\''),
                Some('\'') => break,
                Some(c) => val.push(c),
                None => {
                    return Err(Error::Parse(format!(
                        "[Lexer] Unterminated string starting at position {}",
                        start
                    )))
                }
            }
        }
        Ok(Some(Token::String(val)))
    }

    /// Scans a numeric literal (integer or floating-point)
    fn scan_number(&mut self) -> Option<Token> {
        let mut val = self.next_while(|c| c.is_ascii_digit())?;
        if let Some(sep) = self.next_if(|c| c == '.') {
            val.push(sep);
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                val.push(c);
            }
        }
        Some(Token::Number(val))
    }

    /// Scans an identifier or keyword
    fn scan_ident(&mut self) -> Option<Token> {
        let mut val = self.next_if(|c| c.is_alphabetic() || c == '_')?.to_string();
        while let Some(c) = self.next_if(|c| c.is_alphanumeric() || c == '_') {
            val.push(c);
        }
        // Keywords are case-insensitive, identifiers keep their spelling
        Some(Keyword::from_str(&val).map_or(Token::Ident(val), Token::Keyword))
    }

    /// Scans a single-character symbol token
    fn scan_symbol(&mut self) -> Option<Token> {
        self.next_if_token(|c| match c {
            '*' => Some(Token::Asterisk),
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '-' => Some(Token::Minus),
            '=' => Some(Token::Equal),
            '?' => Some(Token::Question),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::{
        error::{Error, Result},
        sql::parser::lexer::{Keyword, Token},
    };

    #[test]
    fn test_lexer_create_table() -> Result<()> {
        let tokens = Lexer::new(
            "CREATE table users
                (
                    id integer primary key,
                    email TEXT unique not null
                );
                ",
        )
        .collect::<Result<Vec<_>>>()?;

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Create),
                Token::Keyword(Keyword::Table),
                Token::Ident("users".to_string()),
                Token::OpenParen,
                Token::Ident("id".to_string()),
                Token::Keyword(Keyword::Integer),
                Token::Keyword(Keyword::Primary),
                Token::Keyword(Keyword::Key),
                Token::Comma,
                Token::Ident("email".to_string()),
                Token::Keyword(Keyword::Text),
                Token::Keyword(Keyword::Unique),
                Token::Keyword(Keyword::Not),
                Token::Keyword(Keyword::Null),
                Token::CloseParen,
                Token::Semicolon
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lexer_insert_into() -> Result<()> {
        let tokens = Lexer::new("insert into tbl values (1, ?, 'it''s', true, -4.55, NULL)")
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Insert),
                Token::Keyword(Keyword::Into),
                Token::Ident("tbl".to_string()),
                Token::Keyword(Keyword::Values),
                Token::OpenParen,
                Token::Number("1".to_string()),
                Token::Comma,
                Token::Question,
                Token::Comma,
                Token::String("it's".to_string()),
                Token::Comma,
                Token::Keyword(Keyword::True),
                Token::Comma,
                Token::Minus,
                Token::Number("4.55".to_string()),
                Token::Comma,
                Token::Keyword(Keyword::Null),
                Token::CloseParen,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lexer_select_join() -> Result<()> {
        let tokens = Lexer::new("SELECT name FROM Authors LEFT JOIN books ON id = author_id LIMIT 5;")
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Select),
                Token::Ident("name".to_string()),
                Token::Keyword(Keyword::From),
                Token::Ident("Authors".to_string()),
                Token::Keyword(Keyword::Left),
                Token::Keyword(Keyword::Join),
                Token::Ident("books".to_string()),
                Token::Keyword(Keyword::On),
                Token::Ident("id".to_string()),
                Token::Equal,
                Token::Ident("author_id".to_string()),
                Token::Keyword(Keyword::Limit),
                Token::Number("5".to_string()),
                Token::Semicolon,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lexer_errors() {
        let err = Lexer::new("select * from t where a > 1")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Parse("[Lexer] Unexpected character > at position 24".to_string())
        );

        let err = Lexer::new("select 'abc")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert!(err.to_string().contains("position 7"));
    }
}
