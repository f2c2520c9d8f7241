//! bindscript parser - AST construction for the bindscript binding language.
//!
//! This crate turns source text into an AST of statements and expressions.
//! Parsing stops at the first error.
//!
//! # Example
//!
//! ```
//! use bindscript_parser::{Parser, Stmt};
//!
//! let mut parser = Parser::new("let total = price * (1 + tax)");
//! let stmts = parser.parse_statements().unwrap();
//! assert!(matches!(stmts[0], Stmt::Decl(_)));
//! ```

pub mod ast;
pub mod error;
mod expr;
pub mod literal;
pub mod parser;
pub mod pattern;

pub use ast::*;
pub use error::{format_message, ErrorCode, ParseError};
pub use literal::{decode_number, decode_string, MAX_SAFE_INTEGER};
pub use parser::{parse, Parser};
