//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser
//! - `types`: SQL data types and values
//! - `schema`: Table and column definitions, constraints, index upkeep
//! - `plan`: Execution plan generation and parameter binding
//! - `executor`: Query and mutation execution
//! - `engine`: Catalog abstraction and statement sessions

pub mod parser;
pub mod types;
pub mod schema;
pub mod plan;
pub mod executor;
pub mod engine;
