//! bindscript - parser for a compact scripting language used to bind UI
//! properties and event handlers to computed values.
//!
//! # Example
//!
//! ```
//! use bindscript::{parse_expr, Expr};
//!
//! let expr = parse_expr("item.price * qty").unwrap();
//! assert!(matches!(expr, Expr::Binary(_)));
//! ```

pub use bindscript_lexer as lexer;
pub use bindscript_parser as parser;

// Re-export commonly used types
pub use bindscript_lexer::{Lexer, LexerError, LexerOptions, Position, Token, TokenKind, TokenSource};
pub use bindscript_parser::{
    ErrorCode, Expr, LiteralValue, Node, ParseError, Parser, Pattern, Span, Stmt,
};

/// Parse a complete script into its statements.
///
/// # Example
///
/// ```
/// use bindscript::parse_statements;
///
/// let stmts = parse_statements("let x = 10\nx * 2").unwrap();
/// assert_eq!(stmts.len(), 2);
/// ```
pub fn parse_statements(source: &str) -> Result<Vec<Stmt>, ParseError> {
    Parser::new(source).parse_statements()
}

/// Parse a single expression, allowing comma sequences. Trailing input after
/// the expression is ignored; use [`parse_expr_with_tail`] to inspect it.
pub fn parse_expr(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source).parse_expr(true)
}

/// Parse a single expression and return it along with the unconsumed rest of
/// the source.
///
/// # Example
///
/// ```
/// use bindscript::parse_expr_with_tail;
///
/// let (_, tail) = parse_expr_with_tail("count + 1 }} rest").unwrap();
/// assert_eq!(tail, "}} rest");
/// ```
pub fn parse_expr_with_tail(source: &str) -> Result<(Expr, String), ParseError> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expr(true)?;
    Ok((expr, parser.tail()))
}
