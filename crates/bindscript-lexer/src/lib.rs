//! bindscript lexer - tokenization for the bindscript binding language.
//!
//! This crate converts source code into tokens and exposes a buffered
//! [`TokenSource`] with bounded lookahead for the parser.
//!
//! # Example
//!
//! ```
//! use bindscript_lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("let x = 42");
//! let token = lexer.next_token().unwrap();
//! assert_eq!(token.kind, TokenKind::Let);
//! ```

pub mod lexer;
pub mod source;
pub mod token;

pub use lexer::{line_text, tokenize, Lexer, LexerError, LexerOptions, LexerState};
pub use source::{TokenSource, MAX_LOOKAHEAD};
pub use token::{lookup_identifier, Position, Token, TokenKind};
