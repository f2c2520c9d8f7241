//! Decoding of numeric and string literal tokens.

use bindscript_lexer::TokenKind;
use num_bigint::BigInt;
use num_traits::Signed;

use crate::ast::LiteralValue;
use crate::error::ErrorCode;

/// Largest integer `n` such that every integer in `-n..=n` is exactly
/// representable as an `f64`.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Decode the text of a numeric token.
///
/// Integer forms are computed exactly first. Values outside the safe-integer
/// range stay as [`LiteralValue::BigInt`]; everything else becomes a
/// [`LiteralValue::Number`].
pub fn decode_number(kind: TokenKind, text: &str) -> Result<LiteralValue, ErrorCode> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();

    let (radix, body) = match kind {
        TokenKind::Decimal => (10, digits.as_str()),
        TokenKind::Hex => (16, digits.get(2..).unwrap_or_default()),
        TokenKind::Binary => (2, digits.get(2..).unwrap_or_default()),
        TokenKind::Real => {
            return digits
                .parse::<f64>()
                .map(LiteralValue::Number)
                .map_err(|_| ErrorCode::Lexical);
        }
        _ => return Err(ErrorCode::Lexical),
    };

    let value = BigInt::parse_bytes(body.as_bytes(), radix).ok_or(ErrorCode::Lexical)?;
    if value.abs() > BigInt::from(MAX_SAFE_INTEGER) {
        return Ok(LiteralValue::BigInt(value));
    }

    let n = i64::from_str_radix(body, radix).map_err(|_| ErrorCode::Lexical)?;
    Ok(LiteralValue::Number(n as f64))
}

/// Decode a quoted string token into its value.
///
/// Supports `\b \f \n \r \t \v \0`, `\xHH`, `\uHHHH`, `\u{H..HHHHHH}` and
/// line continuations; any other escaped character stands for itself. An
/// escape cut short by the end of the literal is kept as far as it got.
pub fn decode_string(raw: &str) -> String {
    let mut chars = raw.chars();
    let body = match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let rest = chars.as_str();
            rest.strip_suffix(quote).unwrap_or(rest)
        }
        _ => raw,
    };

    let mut unescaper = Unescaper::new(body.len());
    for c in body.chars() {
        unescaper.feed(c);
    }
    unescaper.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Backslash,
    /// Inside `\x`, after `digits` of at most 2 hex digits.
    Hex { digits: u8, value: u32 },
    /// Inside `\u`, after `digits` of at most 4 hex digits.
    Unicode { digits: u8, value: u32 },
    /// Inside `\u{`, after `digits` of at most 6 hex digits.
    Brace { digits: u8, value: u32 },
}

struct Unescaper {
    out: String,
    state: State,
    high_surrogate: Option<u32>,
}

impl Unescaper {
    fn new(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            state: State::Normal,
            high_surrogate: None,
        }
    }

    fn feed(&mut self, c: char) {
        match self.state {
            State::Normal => {
                if c == '\\' {
                    self.state = State::Backslash;
                } else {
                    self.push_char(c);
                }
            }
            State::Backslash => {
                self.state = State::Normal;
                match c {
                    'b' => self.push_char('\u{8}'),
                    'f' => self.push_char('\u{c}'),
                    'n' => self.push_char('\n'),
                    'r' => self.push_char('\r'),
                    't' => self.push_char('\t'),
                    'v' => self.push_char('\u{b}'),
                    '0' => self.push_char('\0'),
                    'x' => self.state = State::Hex { digits: 0, value: 0 },
                    'u' => self.state = State::Unicode { digits: 0, value: 0 },
                    // line continuation
                    '\n' | '\r' => {}
                    other => self.push_char(other),
                }
            }
            State::Hex { digits, value } => match c.to_digit(16) {
                Some(d) if digits == 1 => {
                    self.state = State::Normal;
                    self.push_code_point(value * 16 + d);
                }
                Some(d) => {
                    self.state = State::Hex {
                        digits: digits + 1,
                        value: value * 16 + d,
                    }
                }
                None => self.abandon(c),
            },
            State::Unicode { digits: 0, .. } if c == '{' => {
                self.state = State::Brace { digits: 0, value: 0 };
            }
            State::Unicode { digits, value } => match c.to_digit(16) {
                Some(d) if digits == 3 => {
                    self.state = State::Normal;
                    self.push_code_point(value * 16 + d);
                }
                Some(d) => {
                    self.state = State::Unicode {
                        digits: digits + 1,
                        value: value * 16 + d,
                    }
                }
                None => self.abandon(c),
            },
            State::Brace { digits, value } => match (c, c.to_digit(16)) {
                ('}', _) if digits > 0 => {
                    self.state = State::Normal;
                    self.push_code_point(value);
                }
                (_, Some(d)) if digits < 6 => {
                    self.state = State::Brace {
                        digits: digits + 1,
                        value: value * 16 + d,
                    }
                }
                _ => self.abandon(c),
            },
        }
    }

    /// Close a malformed escape leniently and reprocess `c` as plain text.
    fn abandon(&mut self, c: char) {
        self.flush_pending();
        self.feed(c);
    }

    /// Emit whatever a partially read escape has accumulated.
    fn flush_pending(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Normal);
        match state {
            State::Normal => {}
            State::Backslash => self.push_char('\\'),
            State::Hex { digits: 0, .. } => self.push_char('x'),
            State::Unicode { digits: 0, .. } | State::Brace { digits: 0, .. } => {
                self.push_char('u')
            }
            State::Hex { value, .. } | State::Unicode { value, .. } | State::Brace { value, .. } => {
                self.push_code_point(value)
            }
        }
    }

    fn push_char(&mut self, c: char) {
        if self.high_surrogate.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
        self.out.push(c);
    }

    fn push_code_point(&mut self, cp: u32) {
        if let Some(high) = self.high_surrogate.take() {
            if (0xDC00..=0xDFFF).contains(&cp) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (cp - 0xDC00);
                self.out
                    .push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                return;
            }
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
        if (0xD800..=0xDBFF).contains(&cp) {
            self.high_surrogate = Some(cp);
            return;
        }
        self.out
            .push(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    fn finish(mut self) -> String {
        self.flush_pending();
        if self.high_surrogate.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
        self.out
    }
}
