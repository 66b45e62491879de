//! ByteDB - A small relational data engine in Rust
//!
//! This crate provides a minimal SQL database with:
//! - SQL parsing (lexer, parser, AST) with `?` parameter binding
//! - Query planning and execution, including inner and left joins
//! - Primary key, unique and NOT NULL constraints
//! - Single-column hash indices
//! - One snapshot file per table, reloaded on open
//!
//! ```rust
//! use bytedb::{Database, Output, sql::types::Value};
//!
//! let db = Database::in_memory().unwrap();
//! db.run("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[]);
//! db.run("INSERT INTO users VALUES (?, ?)", &[Value::Integer(1), Value::from("ann")]);
//! let output = db.run("SELECT name FROM users WHERE id = 1", &[]);
//! assert_eq!(
//!     output,
//!     Output::Rows { columns: vec!["name".into()], rows: vec![vec![Value::from("ann")]] }
//! );
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use database::{Database, Output};
