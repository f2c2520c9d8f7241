//! Token types for the bindscript lexer.

use std::fmt;

/// Token kinds for the bindscript language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // Literals
    Ident,
    Decimal,
    Hex,
    Binary,
    Real,
    String,
    Regex,

    // Arithmetic
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Pow,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEquals,
    GtEquals,

    // Logical
    And,
    Or,
    Nullish,
    Bang,

    // Bitwise
    Tilde,
    Ampersand,
    Pipe,
    Caret,
    LtLt,
    GtGt,
    GtGtGt,

    // Assignment
    Assign,
    PlusEquals,
    MinusEquals,
    AsteriskEquals,
    SlashEquals,
    PercentEquals,
    PowEquals,
    LtLtEquals,
    GtGtEquals,
    GtGtGtEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,
    AndEquals,
    OrEquals,
    NullishEquals,

    // Increment/Decrement
    PlusPlus,
    MinusMinus,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Period,
    Spread,
    Arrow,
    Question,
    QuestionDot,

    // Keywords
    Let,
    Const,
    Var,
    If,
    Else,
    While,
    Do,
    For,
    In,
    Return,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    Switch,
    Case,
    Default,
    Function,
    Import,
    Export,
    True,
    False,
    Null,
    Undefined,
    Infinity,
    NaN,
    Global,
    Typeof,
    Instanceof,

    // Special
    Whitespace,
    Eof,
    Illegal,
}

impl TokenKind {
    /// Returns true for reserved words. Reserved words remain valid
    /// property names after `.` and `?.`.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Throw
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Function
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::Infinity
                | TokenKind::NaN
                | TokenKind::Global
                | TokenKind::Typeof
                | TokenKind::Instanceof
        )
    }

    /// Identifier or reserved word.
    pub fn is_keyword_like(self) -> bool {
        self == TokenKind::Ident || self.is_keyword()
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::AsteriskEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
                | TokenKind::PowEquals
                | TokenKind::LtLtEquals
                | TokenKind::GtGtEquals
                | TokenKind::GtGtGtEquals
                | TokenKind::AmpersandEquals
                | TokenKind::PipeEquals
                | TokenKind::CaretEquals
                | TokenKind::AndEquals
                | TokenKind::OrEquals
                | TokenKind::NullishEquals
        )
    }

    pub fn is_number(self) -> bool {
        matches!(
            self,
            TokenKind::Decimal | TokenKind::Hex | TokenKind::Binary | TokenKind::Real
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Decimal => "DECIMAL",
            TokenKind::Hex => "HEX",
            TokenKind::Binary => "BINARY",
            TokenKind::Real => "REAL",
            TokenKind::String => "STRING",
            TokenKind::Regex => "REGEX",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Pow => "**",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::StrictEq => "===",
            TokenKind::StrictNotEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEquals => "<=",
            TokenKind::GtEquals => ">=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Nullish => "??",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Ampersand => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::GtGtGt => ">>>",
            TokenKind::Assign => "=",
            TokenKind::PlusEquals => "+=",
            TokenKind::MinusEquals => "-=",
            TokenKind::AsteriskEquals => "*=",
            TokenKind::SlashEquals => "/=",
            TokenKind::PercentEquals => "%=",
            TokenKind::PowEquals => "**=",
            TokenKind::LtLtEquals => "<<=",
            TokenKind::GtGtEquals => ">>=",
            TokenKind::GtGtGtEquals => ">>>=",
            TokenKind::AmpersandEquals => "&=",
            TokenKind::PipeEquals => "|=",
            TokenKind::CaretEquals => "^=",
            TokenKind::AndEquals => "&&=",
            TokenKind::OrEquals => "||=",
            TokenKind::NullishEquals => "??=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Period => ".",
            TokenKind::Spread => "...",
            TokenKind::Arrow => "=>",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Var => "var",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Throw => "throw",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Function => "function",
            TokenKind::Import => "import",
            TokenKind::Export => "export",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            TokenKind::Infinity => "Infinity",
            TokenKind::NaN => "NaN",
            TokenKind::Global => "global",
            TokenKind::Typeof => "typeof",
            TokenKind::Instanceof => "instanceof",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        };
        write!(f, "{}", s)
    }
}

/// Look up an identifier to see if it's a keyword.
pub fn lookup_identifier(ident: &str) -> TokenKind {
    match ident {
        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "throw" => TokenKind::Throw,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "function" => TokenKind::Function,
        "import" => TokenKind::Import,
        "export" => TokenKind::Export,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        "Infinity" => TokenKind::Infinity,
        "NaN" => TokenKind::NaN,
        "global" => TokenKind::Global,
        "typeof" => TokenKind::Typeof,
        "instanceof" => TokenKind::Instanceof,
        _ => TokenKind::Ident,
    }
}

/// Position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Character offset within the source.
    pub char: usize,
    /// Character offset of the start of the current line.
    pub line_start: usize,
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column number.
    pub column: usize,
}

impl Position {
    /// Create a new Position.
    pub fn new(char: usize, line_start: usize, line: usize, column: usize) -> Self {
        Self {
            char,
            line_start,
            line,
            column,
        }
    }

    /// Returns the 1-indexed line number.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }

    /// Returns the 1-indexed column number.
    pub fn column_number(&self) -> usize {
        self.column + 1
    }

    /// Advance this position by n characters on the same line.
    pub fn advance(&self, n: usize) -> Self {
        Self {
            char: self.char + n,
            line_start: self.line_start,
            line: self.line,
            column: self.column + n,
        }
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The source text of the token. String and regex tokens keep their
    /// delimiters and escapes; decoding happens in the parser.
    pub text: String,
    /// Start position in source.
    pub start: Position,
    /// End position in source (exclusive).
    pub end: Position,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    /// Create a new Token.
    pub fn new(kind: TokenKind, text: String, start: Position, end: Position) -> Self {
        Self {
            kind,
            text,
            start,
            end,
            newline_before: false,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for an identifier whose text is `word`. Used for contextual
    /// words such as `of`, `from` and `as`.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_identifier() {
        assert_eq!(lookup_identifier("let"), TokenKind::Let);
        assert_eq!(lookup_identifier("var"), TokenKind::Var);
        assert_eq!(lookup_identifier("Infinity"), TokenKind::Infinity);
        assert_eq!(lookup_identifier("of"), TokenKind::Ident);
        assert_eq!(lookup_identifier("from"), TokenKind::Ident);
    }

    #[test]
    fn test_keyword_like() {
        assert!(TokenKind::Ident.is_keyword_like());
        assert!(TokenKind::Default.is_keyword_like());
        assert!(TokenKind::Typeof.is_keyword_like());
        assert!(!TokenKind::String.is_keyword_like());
        assert!(!TokenKind::Period.is_keyword_like());
    }

    #[test]
    fn test_assignment_kinds() {
        assert!(TokenKind::Assign.is_assignment());
        assert!(TokenKind::NullishEquals.is_assignment());
        assert!(!TokenKind::Eq.is_assignment());
        assert!(!TokenKind::Arrow.is_assignment());
    }

    #[test]
    fn test_position() {
        let pos = Position::new(10, 5, 1, 5);
        assert_eq!(pos.line_number(), 2);
        assert_eq!(pos.column_number(), 6);

        let advanced = pos.advance(3);
        assert_eq!(advanced.char, 13);
        assert_eq!(advanced.column, 8);
    }

    #[test]
    fn test_position_ordering() {
        let a = Position::new(3, 0, 0, 3);
        let b = Position::new(7, 5, 1, 2);
        assert!(a < b);
    }

    #[test]
    fn test_contextual_word() {
        let tok = Token::new(
            TokenKind::Ident,
            "of".to_string(),
            Position::default(),
            Position::default().advance(2),
        );
        assert!(tok.is_word("of"));
        assert!(!tok.is_word("in"));
    }
}
