//! Lexer for the bindscript binding language.

use crate::token::{lookup_identifier, Position, Token, TokenKind};
use thiserror::Error;

/// Errors that can occur during lexing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error(
        "invalid number literal: {literal} at line {}, column {}",
        .position.line_number(),
        .position.column_number()
    )]
    InvalidNumber { literal: String, position: Position },

    #[error(
        "unterminated string literal at line {}, column {}",
        .position.line_number(),
        .position.column_number()
    )]
    UnterminatedString { position: Position },

    #[error(
        "unterminated comment at line {}, column {}",
        .position.line_number(),
        .position.column_number()
    )]
    UnterminatedComment { position: Position },

    #[error(
        "invalid regular expression: {reason} at line {}, column {}",
        .position.line_number(),
        .position.column_number()
    )]
    InvalidRegex { reason: String, position: Position },
}

impl LexerError {
    /// Where the offending literal or comment starts.
    pub fn position(&self) -> Position {
        match self {
            LexerError::InvalidNumber { position, .. }
            | LexerError::UnterminatedString { position }
            | LexerError::UnterminatedComment { position }
            | LexerError::InvalidRegex { position, .. } => *position,
        }
    }
}

/// Lexer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Emit runs of whitespace as [`TokenKind::Whitespace`] tokens instead of
    /// skipping them. Used by the sibling mini-languages that care about
    /// spacing between tokens.
    pub preserve_whitespace: bool,
}

/// Saved lexer state for backtracking.
#[derive(Debug, Clone)]
pub struct LexerState {
    position: usize,
    next_position: usize,
    ch: char,
    line: usize,
    column: isize,
    line_start: usize,
}

/// Lexer tokenizes bindscript source code.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    next_position: usize,
    ch: char,
    line: usize,
    column: isize,
    line_start: usize,
    token_start: Position,
    newline_seen: bool,
    options: LexerOptions,
}

impl Lexer {
    /// Create a new lexer for the given input.
    pub fn new(input: &str) -> Self {
        Self::with_options(input, LexerOptions::default())
    }

    /// Create a new lexer with explicit options.
    pub fn with_options(input: &str, options: LexerOptions) -> Self {
        let mut lexer = Self {
            chars: input.chars().collect(),
            position: 0,
            next_position: 0,
            ch: '\0',
            line: 0,
            column: -1,
            line_start: 0,
            token_start: Position::default(),
            newline_seen: false,
            options,
        };
        lexer.read_char();
        lexer
    }

    /// Save the current lexer state for backtracking.
    pub fn save_state(&self) -> LexerState {
        LexerState {
            position: self.position,
            next_position: self.next_position,
            ch: self.ch,
            line: self.line,
            column: self.column,
            line_start: self.line_start,
        }
    }

    /// Restore a previously saved lexer state.
    pub fn restore_state(&mut self, state: LexerState) {
        self.position = state.position;
        self.next_position = state.next_position;
        self.ch = state.ch;
        self.line = state.line;
        self.column = state.column;
        self.line_start = state.line_start;
    }

    /// State that resumes scanning at `pos`, which must be a token start
    /// produced by this lexer.
    fn state_at(&self, pos: Position) -> LexerState {
        LexerState {
            position: pos.char,
            next_position: pos.char + 1,
            ch: self.chars.get(pos.char).copied().unwrap_or('\0'),
            line: pos.line,
            column: pos.column as isize,
            line_start: pos.line_start,
        }
    }

    /// Source text from character offset `from` to the end of input.
    pub fn text_from(&self, from: usize) -> String {
        self.chars[from.min(self.chars.len())..].iter().collect()
    }

    /// Get the current position.
    pub fn current_position(&self) -> Position {
        Position::new(
            self.position,
            self.line_start,
            self.line,
            self.column.max(0) as usize,
        )
    }

    /// Read the next character.
    fn read_char(&mut self) {
        if self.next_position >= self.chars.len() {
            self.ch = '\0';
        } else {
            self.ch = self.chars[self.next_position];
        }
        self.position = self.next_position.min(self.chars.len());
        self.next_position += 1;
        self.column += 1;
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Peek at the next character without consuming it.
    fn peek_char(&self) -> char {
        self.peek_char_n(1)
    }

    /// Peek n characters ahead without consuming.
    fn peek_char_n(&self, n: usize) -> char {
        self.chars.get(self.position + n).copied().unwrap_or('\0')
    }

    /// Handle newline and update line tracking.
    fn handle_newline(&mut self) {
        self.line += 1;
        self.column = -1;
        self.line_start = self.next_position;
        self.newline_seen = true;
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && is_whitespace(self.ch) {
            if self.ch == '\n' {
                self.handle_newline();
            }
            self.read_char();
        }
    }

    fn skip_to_end_of_line(&mut self) {
        while self.ch != '\n' && !self.at_end() {
            self.read_char();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let position = self.current_position();
        self.read_char(); // consume /
        self.read_char(); // consume *
        while !(self.ch == '*' && self.peek_char() == '/') {
            if self.at_end() {
                return Err(LexerError::UnterminatedComment { position });
            }
            if self.ch == '\n' {
                self.handle_newline();
            }
            self.read_char();
        }
        self.read_char(); // consume *
        self.read_char(); // consume /
        Ok(())
    }

    /// Start tracking a new token.
    fn start_token(&mut self) {
        self.token_start = self.current_position();
    }

    /// Create a token ending at the current position.
    fn make_token(&self, kind: TokenKind, text: String) -> Token {
        let mut token = Token::new(kind, text, self.token_start, self.current_position());
        token.newline_before = self.newline_seen;
        token
    }

    fn text_since(&self, start: usize) -> String {
        self.chars[start..self.position].iter().collect()
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.newline_seen = false;

        loop {
            if !self.at_end() && is_whitespace(self.ch) {
                if self.options.preserve_whitespace {
                    return Ok(self.read_whitespace());
                }
                self.skip_whitespace();
                continue;
            }
            if self.ch == '/' && self.peek_char() == '/' {
                self.skip_to_end_of_line();
                continue;
            }
            if self.ch == '/' && self.peek_char() == '*' {
                self.skip_block_comment()?;
                continue;
            }
            break;
        }

        self.start_token();

        if self.at_end() {
            return Ok(self.make_token(TokenKind::Eof, String::new()));
        }

        if self.ch == '"' || self.ch == '\'' {
            return self.read_string(self.ch);
        }

        if self.ch.is_ascii_digit() || (self.ch == '.' && self.peek_char().is_ascii_digit()) {
            return self.read_number();
        }

        if is_ident_start(self.ch) {
            return Ok(self.read_identifier());
        }

        if let Some(tok) = self.read_operator() {
            return Ok(tok);
        }

        // Unknown character
        let ch = self.ch;
        self.read_char();
        Ok(self.make_token(TokenKind::Illegal, ch.to_string()))
    }

    fn read_whitespace(&mut self) -> Token {
        self.start_token();
        let start = self.position;
        self.skip_whitespace();
        let text = self.text_since(start);
        self.make_token(TokenKind::Whitespace, text)
    }

    /// Read an identifier or keyword.
    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while !self.at_end() && is_ident_part(self.ch) {
            self.read_char();
        }
        let text = self.text_since(start);
        let kind = lookup_identifier(&text);
        self.make_token(kind, text)
    }

    /// Read a number literal. Separators are kept in the text; the parser
    /// strips them while decoding.
    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start = self.position;

        if self.ch == '0' {
            let next = self.peek_char().to_ascii_lowercase();
            let radix = match next {
                'x' => Some((TokenKind::Hex, 16)),
                'b' => Some((TokenKind::Binary, 2)),
                _ => None,
            };
            if let Some((kind, radix)) = radix {
                self.read_char(); // consume 0
                self.read_char(); // consume x / b
                let digits_start = self.position;
                while self.ch.is_digit(radix) || self.ch == '_' {
                    self.read_char();
                }
                let text = self.text_since(start);
                if self.position == digits_start {
                    return Err(LexerError::InvalidNumber {
                        literal: text,
                        position: self.token_start,
                    });
                }
                self.check_trailing_alphanumeric(&text)?;
                return Ok(self.make_token(kind, text));
            }
        }

        let mut kind = TokenKind::Decimal;
        while self.ch.is_ascii_digit() || self.ch == '_' {
            self.read_char();
        }

        if self.ch == '.' && self.peek_char().is_ascii_digit() {
            kind = TokenKind::Real;
            self.read_char(); // consume .
            while self.ch.is_ascii_digit() || self.ch == '_' {
                self.read_char();
            }
        }

        if self.ch == 'e' || self.ch == 'E' {
            let next = self.peek_char();
            let signed = (next == '+' || next == '-') && self.peek_char_n(2).is_ascii_digit();
            if next.is_ascii_digit() || signed {
                kind = TokenKind::Real;
                self.read_char(); // consume e/E
                if signed {
                    self.read_char();
                }
                while self.ch.is_ascii_digit() || self.ch == '_' {
                    self.read_char();
                }
            }
        }

        let text = self.text_since(start);
        self.check_trailing_alphanumeric(&text)?;
        Ok(self.make_token(kind, text))
    }

    /// Check for invalid trailing alphanumeric after number.
    fn check_trailing_alphanumeric(&self, text: &str) -> Result<(), LexerError> {
        if !self.at_end() && is_ident_part(self.ch) {
            return Err(LexerError::InvalidNumber {
                literal: format!("{}{}", text, self.ch),
                position: self.token_start,
            });
        }
        Ok(())
    }

    /// Read a quoted string literal. The token text keeps the quotes and
    /// escape sequences verbatim.
    fn read_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let start = self.position;
        self.read_char(); // consume opening quote

        loop {
            if self.at_end() || self.ch == '\n' {
                return Err(LexerError::UnterminatedString {
                    position: self.token_start,
                });
            }
            if self.ch == '\\' {
                self.read_char();
                if self.at_end() {
                    return Err(LexerError::UnterminatedString {
                        position: self.token_start,
                    });
                }
                if self.ch == '\n' {
                    self.handle_newline();
                }
                self.read_char();
                continue;
            }
            if self.ch == quote {
                self.read_char(); // consume closing quote
                break;
            }
            self.read_char();
        }

        Ok(self.make_token(TokenKind::String, self.text_since(start)))
    }

    /// Rescan from `start`, the position of a `/` or `/=` token, as a regular
    /// expression literal. The token text is the full `/body/flags` form.
    pub fn scan_regex(&mut self, start: Position) -> Result<Token, LexerError> {
        let state = self.state_at(start);
        self.restore_state(state);
        self.newline_seen = false;
        self.start_token();

        if self.ch != '/' {
            return Err(LexerError::InvalidRegex {
                reason: "expected '/'".to_string(),
                position: self.token_start,
            });
        }
        let begin = self.position;
        self.read_char(); // consume opening /

        let mut in_class = false;
        loop {
            if self.at_end() || self.ch == '\n' {
                return Err(LexerError::InvalidRegex {
                    reason: "unterminated literal".to_string(),
                    position: self.token_start,
                });
            }
            match self.ch {
                '\\' => {
                    self.read_char();
                    if self.at_end() || self.ch == '\n' {
                        return Err(LexerError::InvalidRegex {
                            reason: "unterminated escape".to_string(),
                            position: self.token_start,
                        });
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    self.read_char(); // consume closing /
                    break;
                }
                _ => {}
            }
            self.read_char();
        }

        while !self.at_end() && is_ident_part(self.ch) {
            self.read_char();
        }

        Ok(self.make_token(TokenKind::Regex, self.text_since(begin)))
    }

    /// Read an operator or punctuation token, longest match first.
    fn read_operator(&mut self) -> Option<Token> {
        let ch = self.ch;
        let next = self.peek_char();
        let third = self.peek_char_n(2);

        if (ch, next, third, self.peek_char_n(3)) == ('>', '>', '>', '=') {
            return Some(self.take_operator(TokenKind::GtGtGtEquals, 4));
        }

        let three_char = match (ch, next, third) {
            ('.', '.', '.') => Some(TokenKind::Spread),
            ('=', '=', '=') => Some(TokenKind::StrictEq),
            ('!', '=', '=') => Some(TokenKind::StrictNotEq),
            ('*', '*', '=') => Some(TokenKind::PowEquals),
            ('<', '<', '=') => Some(TokenKind::LtLtEquals),
            ('>', '>', '=') => Some(TokenKind::GtGtEquals),
            ('>', '>', '>') => Some(TokenKind::GtGtGt),
            ('&', '&', '=') => Some(TokenKind::AndEquals),
            ('|', '|', '=') => Some(TokenKind::OrEquals),
            ('?', '?', '=') => Some(TokenKind::NullishEquals),
            _ => None,
        };
        if let Some(kind) = three_char {
            return Some(self.take_operator(kind, 3));
        }

        let two_char = match (ch, next) {
            ('=', '=') => Some(TokenKind::Eq),
            ('=', '>') => Some(TokenKind::Arrow),
            ('!', '=') => Some(TokenKind::NotEq),
            ('<', '=') => Some(TokenKind::LtEquals),
            ('<', '<') => Some(TokenKind::LtLt),
            ('>', '=') => Some(TokenKind::GtEquals),
            ('>', '>') => Some(TokenKind::GtGt),
            ('&', '&') => Some(TokenKind::And),
            ('&', '=') => Some(TokenKind::AmpersandEquals),
            ('|', '|') => Some(TokenKind::Or),
            ('|', '=') => Some(TokenKind::PipeEquals),
            ('^', '=') => Some(TokenKind::CaretEquals),
            ('+', '+') => Some(TokenKind::PlusPlus),
            ('+', '=') => Some(TokenKind::PlusEquals),
            ('-', '-') => Some(TokenKind::MinusMinus),
            ('-', '=') => Some(TokenKind::MinusEquals),
            ('*', '*') => Some(TokenKind::Pow),
            ('*', '=') => Some(TokenKind::AsteriskEquals),
            ('/', '=') => Some(TokenKind::SlashEquals),
            ('%', '=') => Some(TokenKind::PercentEquals),
            ('?', '?') => Some(TokenKind::Nullish),
            // `a?.5:b` is a conditional, not optional chaining
            ('?', '.') if !third.is_ascii_digit() => Some(TokenKind::QuestionDot),
            _ => None,
        };
        if let Some(kind) = two_char {
            return Some(self.take_operator(kind, 2));
        }

        let single_char = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Asterisk),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '=' => Some(TokenKind::Assign),
            '!' => Some(TokenKind::Bang),
            '~' => Some(TokenKind::Tilde),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '&' => Some(TokenKind::Ampersand),
            '|' => Some(TokenKind::Pipe),
            '^' => Some(TokenKind::Caret),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            ':' => Some(TokenKind::Colon),
            '.' => Some(TokenKind::Period),
            '?' => Some(TokenKind::Question),
            _ => None,
        };
        single_char.map(|kind| self.take_operator(kind, 1))
    }

    fn take_operator(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        for _ in 0..len {
            self.read_char();
        }
        let text = self.text_since(start);
        self.make_token(kind, text)
    }
}

/// The full text of the line containing `pos`.
pub fn line_text(chars: &[char], pos: &Position) -> String {
    let start = pos.line_start.min(chars.len());
    chars[start..]
        .iter()
        .take_while(|&&c| c != '\n' && c != '\r')
        .collect()
}

fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t' | '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}'
    )
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Tokenize an input string into a vector of tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
