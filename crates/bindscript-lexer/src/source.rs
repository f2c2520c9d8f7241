//! Buffered token stream with bounded lookahead.

use std::collections::VecDeque;

use tracing::trace;

use crate::lexer::{Lexer, LexerError, LexerOptions};
use crate::token::{Position, Token, TokenKind};

/// Maximum number of tokens that can be inspected ahead of the cursor.
pub const MAX_LOOKAHEAD: usize = 4;

/// A pull-based token stream over a [`Lexer`].
///
/// Tokens are scanned lazily and buffered so the parser can peek up to
/// [`MAX_LOOKAHEAD`] tokens ahead. Once the input is exhausted every request
/// yields an `Eof` token.
pub struct TokenSource {
    lexer: Lexer,
    buffer: VecDeque<Token>,
    prev_end: Position,
    prev_kind: Option<TokenKind>,
}

impl TokenSource {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, LexerOptions::default())
    }

    pub fn with_options(source: &str, options: LexerOptions) -> Self {
        Self {
            lexer: Lexer::with_options(source, options),
            buffer: VecDeque::with_capacity(MAX_LOOKAHEAD),
            prev_end: Position::default(),
            prev_kind: None,
        }
    }

    fn fill(&mut self, n: usize) -> Result<(), LexerError> {
        while self.buffer.len() <= n {
            let tok = self.lexer.next_token()?;
            trace!(kind = ?tok.kind, text = %tok.text, line = tok.start.line_number(), "scan");
            self.buffer.push_back(tok);
        }
        Ok(())
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self) -> Result<&Token, LexerError> {
        self.peek_n(0)
    }

    /// The token `n` positions ahead of the cursor; `peek_n(0)` is `peek()`.
    pub fn peek_n(&mut self, n: usize) -> Result<&Token, LexerError> {
        debug_assert!(n < MAX_LOOKAHEAD, "lookahead {n} exceeds {MAX_LOOKAHEAD}");
        let n = n.min(MAX_LOOKAHEAD - 1);
        self.fill(n)?;
        Ok(&self.buffer[n])
    }

    /// Consume and return the next token.
    pub fn get(&mut self) -> Result<Token, LexerError> {
        self.fill(0)?;
        match self.buffer.pop_front() {
            Some(tok) => {
                self.prev_end = tok.end;
                self.prev_kind = Some(tok.kind);
                Ok(tok)
            }
            None => self.lexer.next_token(),
        }
    }

    /// End position of the most recently consumed token.
    pub fn prev_end(&self) -> Position {
        self.prev_end
    }

    /// Kind of the most recently consumed token, if any.
    pub fn prev_kind(&self) -> Option<TokenKind> {
        self.prev_kind
    }

    /// Re-read the next token, a `/` or `/=`, as a regular expression literal.
    /// Any tokens buffered beyond it are discarded and scanned again.
    pub fn rescan_regex(&mut self) -> Result<(), LexerError> {
        self.fill(0)?;
        let (start, newline_before) = match self.buffer.front() {
            Some(tok) => (tok.start, tok.newline_before),
            None => return Ok(()),
        };
        self.buffer.clear();
        let mut tok = self.lexer.scan_regex(start)?;
        tok.newline_before = newline_before;
        trace!(text = %tok.text, "rescan regex");
        self.buffer.push_back(tok);
        Ok(())
    }

    /// Unconsumed source text, starting at the next token.
    pub fn tail(&self) -> String {
        let from = match self.buffer.front() {
            Some(tok) if tok.kind != TokenKind::Eof => tok.start.char,
            Some(tok) => tok.end.char,
            None => self.prev_end.char,
        };
        self.lexer.text_from(from)
    }
}
