//! Parse diagnostics.

use bindscript_lexer::{line_text, LexerError};
use thiserror::Error;

use crate::ast::Span;

/// Kinds of parse failure. Each code maps to a message template with `{0}`,
/// `{1}` placeholders filled in by [`format_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnexpectedToken,
    Expected,
    ExpectedOrEnd,
    InvalidDeclaration,
    InvalidDestructure,
    InvalidParameterList,
    InvalidAssignmentTarget,
    MissingInitializer,
    DuplicateDefault,
    DuplicateImport,
    TryWithoutHandler,
    ExportPlacement,
    ExportTarget,
    ForLetWithoutInit,
    InvalidRegex,
    Lexical,
}

impl ErrorCode {
    pub fn template(self) -> &'static str {
        match self {
            ErrorCode::UnexpectedToken => "unexpected token '{0}'",
            ErrorCode::Expected => "expected '{0}' but found '{1}'",
            ErrorCode::ExpectedOrEnd => "expected '{0}' or end of input but found '{1}'",
            ErrorCode::InvalidDeclaration => "'{0}' cannot be declared",
            ErrorCode::InvalidDestructure => "invalid destructuring pattern",
            ErrorCode::InvalidParameterList => "invalid parameter list",
            ErrorCode::InvalidAssignmentTarget => "invalid assignment target",
            ErrorCode::MissingInitializer => "missing initializer in {0} declaration",
            ErrorCode::DuplicateDefault => "more than one default clause in switch statement",
            ErrorCode::DuplicateImport => "'{0}' is imported more than once",
            ErrorCode::TryWithoutHandler => "missing catch or finally after try",
            ErrorCode::ExportPlacement => "export is only allowed at the top level",
            ErrorCode::ExportTarget => "only function declarations can be exported",
            ErrorCode::ForLetWithoutInit => "missing initializer in for loop declaration",
            ErrorCode::InvalidRegex => "invalid regular expression: {0}",
            ErrorCode::Lexical => "{0}",
        }
    }
}

/// Replace `{0}`, `{1}`, ... in `template` with the matching argument.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A located parse diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{text} at line {}, column {}", .span.start.line_number(), .span.start.column_number())]
pub struct ParseError {
    pub code: ErrorCode,
    pub text: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(code: ErrorCode, args: &[&str], span: Span) -> Self {
        Self {
            code,
            text: format_message(code.template(), args),
            span,
        }
    }

    /// Render the offending source line with a caret under the error.
    pub fn excerpt(&self, source: &str) -> String {
        let chars: Vec<char> = source.chars().collect();
        let start = self.span.start;
        let line = line_text(&chars, &start);
        let line_len = line.chars().count();

        let column = start.column.min(line_len);
        let width = if self.span.end.line == start.line && self.span.end.char > start.char {
            self.span.end.char - start.char
        } else {
            1
        };
        let width = width.min(line_len.saturating_sub(column)).max(1);

        let number = start.line_number().to_string();
        let gutter = " ".repeat(number.len());
        format!(
            "error: {}\n{gutter} --> {}:{}\n{gutter} |\n{number} | {line}\n{gutter} | {}{}",
            self.text,
            start.line_number(),
            start.column_number(),
            " ".repeat(column),
            "^".repeat(width),
        )
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        let pos = err.position();
        let span = Span::new(pos, pos);
        match err {
            LexerError::InvalidNumber { literal, .. } => ParseError::new(
                ErrorCode::Lexical,
                &[&format!("invalid number literal '{literal}'")],
                span,
            ),
            LexerError::UnterminatedString { .. } => {
                ParseError::new(ErrorCode::Lexical, &["unterminated string literal"], span)
            }
            LexerError::UnterminatedComment { .. } => {
                ParseError::new(ErrorCode::Lexical, &["unterminated comment"], span)
            }
            LexerError::InvalidRegex { reason, .. } => {
                ParseError::new(ErrorCode::InvalidRegex, &[&reason], span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindscript_lexer::Position;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("expected '{0}' but found '{1}'", &[")", "}"]),
            "expected ')' but found '}'"
        );
        assert_eq!(format_message("no args", &[]), "no args");
        assert_eq!(format_message("{0} and {0}", &["x"]), "x and x");
    }

    #[test]
    fn test_display_includes_location() {
        let pos = Position::new(12, 10, 1, 2);
        let err = ParseError::new(ErrorCode::UnexpectedToken, &[")"], Span::new(pos, pos.advance(1)));
        assert_eq!(err.to_string(), "unexpected token ')' at line 2, column 3");
    }

    #[test]
    fn test_excerpt() {
        let source = "let a = 1\nlet b = )\n";
        let start = Position::new(18, 10, 1, 8);
        let err = ParseError::new(ErrorCode::UnexpectedToken, &[")"], Span::new(start, start.advance(1)));
        let excerpt = err.excerpt(source);
        let lines: Vec<&str> = excerpt.lines().collect();
        assert_eq!(lines[0], "error: unexpected token ')'");
        assert_eq!(lines[1], "  --> 2:9");
        assert_eq!(lines[3], "2 | let b = )");
        assert_eq!(lines[4], "  |         ^");
    }

    #[test]
    fn test_from_lexer_error() {
        let err: ParseError = LexerError::InvalidRegex {
            reason: "unterminated literal".to_string(),
            position: Position::new(4, 0, 0, 4),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidRegex);
        assert_eq!(err.text, "invalid regular expression: unterminated literal");
        assert_eq!(err.span.start.column, 4);

        let err: ParseError = LexerError::UnterminatedString {
            position: Position::default(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Lexical);
        assert_eq!(err.text, "unterminated string literal");
    }
}
