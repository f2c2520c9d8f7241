//! Expression parsing.
//!
//! One method per precedence level, lowest first:
//!
//! ```text
//! sequence      a, b
//! assignment    = += ... ??=   ?:   =>   ...spread
//! nullish       ??
//! logical or    ||
//! logical and   &&
//! bitwise or    |
//! bitwise xor   ^
//! bitwise and   &
//! equality      == != === !==
//! relational    < > <= >= in instanceof
//! shift         << >> >>>
//! additive      + -
//! multiplicative * / %
//! exponent      ** (right-associative)
//! unary         ! ~ + - typeof ++x --x
//! postfix       calls, members, indexing, x++ x--
//! primary
//! ```

use bindscript_lexer::{Position, TokenKind};
use tracing::trace;

use crate::ast::*;
use crate::error::{ErrorCode, ParseError};
use crate::literal::{decode_number, decode_string};
use crate::parser::{describe, token_span, unexpected, PResult, Parser};
use crate::pattern::{loose_sequence_to_pattern, to_array_pattern, to_assign_target, to_params};

type LevelFn = fn(&mut Parser) -> PResult<Option<Expr>>;

impl Parser {
    // ========================================================================
    // Sequences
    // ========================================================================

    /// Parse an expression, optionally allowing a comma-separated sequence.
    ///
    /// A sequence with an empty slot (`a, , b`) can only be a destructuring
    /// target and is returned as an [`ArrayPattern`].
    pub(crate) fn parse_sequence(&mut self, allow_sequence: bool) -> PResult<Option<Expr>> {
        if !allow_sequence {
            return self.parse_assign();
        }

        let start = self.peek()?.start;
        let (mut exprs, loose) = self.parse_list()?;
        if exprs.len() <= 1 && !loose {
            return Ok(exprs.pop());
        }

        let span = self.span_from(start);
        let seq = SequenceExpr {
            span,
            exprs,
            loose,
            parens: 0,
        };
        if loose {
            let pattern =
                loose_sequence_to_pattern(seq).map_err(|code| ParseError::new(code, &[], span))?;
            return Ok(Some(Expr::ArrayPattern(pattern)));
        }
        Ok(Some(Expr::Sequence(seq)))
    }

    /// Parse comma-separated assignment expressions. Empty slots become
    /// [`NoArg`] entries and set the returned `loose` flag. A trailing comma
    /// does not add a slot.
    fn parse_list(&mut self) -> PResult<(Vec<Expr>, bool)> {
        let mut exprs = Vec::new();
        let mut loose = false;
        let mut current = self.parse_assign()?;

        while self.peek_is(TokenKind::Comma)? {
            let comma = self.next()?;
            match current.take() {
                Some(expr) => exprs.push(expr),
                None => {
                    loose = true;
                    exprs.push(Expr::NoArg(NoArg {
                        span: Span::new(comma.start, comma.start),
                        parens: 0,
                    }));
                }
            }
            current = self.parse_assign()?;
        }
        if let Some(expr) = current {
            exprs.push(expr);
        }
        Ok((exprs, loose))
    }

    // ========================================================================
    // Assignment, Conditional, Arrow, Spread
    // ========================================================================

    pub(crate) fn parse_assign(&mut self) -> PResult<Option<Expr>> {
        let start = self.peek()?.start;

        if self.eat(TokenKind::Spread)?.is_some() {
            let argument = self.parse_assign()?;
            let argument = self.require(argument)?;
            return Ok(Some(Expr::Spread(Box::new(SpreadExpr {
                span: self.span_from(start),
                argument,
            }))));
        }

        let Some(left) = self.parse_nullish()? else {
            return Ok(None);
        };

        let tok = self.peek()?.clone();
        match tok.kind {
            TokenKind::Question => {
                self.next()?;
                let consequent = self.parse_assign()?;
                let consequent = self.require(consequent)?;
                self.expect(TokenKind::Colon)?;
                let alternate = self.parse_assign()?;
                let alternate = self.require(alternate)?;
                Ok(Some(Expr::Conditional(Box::new(ConditionalExpr {
                    span: self.span_from(start),
                    test: left,
                    consequent,
                    alternate,
                }))))
            }
            kind if kind.is_assignment() => {
                self.next()?;
                let target_span = left.span();
                let target = to_assign_target(left, &tok.text)
                    .map_err(|code| ParseError::new(code, &[], target_span))?;
                let value = self.parse_assign()?;
                let value = self.require(value)?;
                Ok(Some(Expr::Assign(Box::new(AssignExpr {
                    span: self.span_from(start),
                    op: tok.text,
                    target,
                    value,
                }))))
            }
            TokenKind::Arrow => {
                self.next()?;
                self.parse_arrow(start, left).map(Some)
            }
            _ => Ok(Some(left)),
        }
    }

    /// Parse an arrow function body after `=>`. An expression body is stored
    /// as a `return` statement.
    fn parse_arrow(&mut self, start: Position, params: Expr) -> PResult<Expr> {
        let params_span = params.span();
        let params =
            to_params(params).map_err(|code| ParseError::new(code, &[], params_span))?;

        let body = if self.peek_is(TokenKind::LBrace)? {
            Stmt::Block(self.parse_block()?)
        } else {
            let value = self.parse_assign()?;
            let value = self.require(value)?;
            Stmt::Return(ReturnStmt {
                span: value.span(),
                value: Some(value),
            })
        };

        Ok(Expr::Arrow(Box::new(ArrowExpr {
            span: self.span_from(start),
            params,
            body,
        })))
    }

    // ========================================================================
    // Binary Operators
    // ========================================================================

    /// Parse a left-associative run of `operand (op operand)*`.
    fn parse_binary_level(&mut self, ops: &[TokenKind], operand: LevelFn) -> PResult<Option<Expr>> {
        let start = self.peek()?.start;
        let Some(mut left) = operand(self)? else {
            return Ok(None);
        };

        while ops.contains(&self.peek_kind()?) {
            let op = self.next()?;
            let right = operand(self)?;
            let right = self.require(right)?;
            left = binary(op.text, left, right, self.span_from(start));
        }
        Ok(Some(left))
    }

    fn parse_nullish(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Nullish], Self::parse_or)
    }

    fn parse_or(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::And], Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Pipe], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Caret], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Ampersand], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(
            &[
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::StrictEq,
                TokenKind::StrictNotEq,
            ],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(
            &[
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEquals,
                TokenKind::GtEquals,
                TokenKind::In,
                TokenKind::Instanceof,
            ],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(
            &[TokenKind::LtLt, TokenKind::GtGt, TokenKind::GtGtGt],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> PResult<Option<Expr>> {
        self.parse_binary_level(
            &[TokenKind::Asterisk, TokenKind::Slash, TokenKind::Percent],
            Self::parse_exponent,
        )
    }

    /// `**` is right-associative: each new operand is pushed down the right
    /// spine of the `**` nodes built so far in this run.
    fn parse_exponent(&mut self) -> PResult<Option<Expr>> {
        let Some(mut left) = self.parse_unary()? else {
            return Ok(None);
        };

        let mut depth = 0;
        while self.peek_is(TokenKind::Pow)? {
            let op = self.next()?;
            let right = self.parse_unary()?;
            let right = self.require(right)?;
            left = rotate_pow(left, op.text, right, depth);
            depth += 1;
        }
        Ok(Some(left))
    }

    // ========================================================================
    // Unary and Postfix
    // ========================================================================

    fn parse_unary(&mut self) -> PResult<Option<Expr>> {
        let tok = self.peek()?.clone();
        match tok.kind {
            TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Typeof => {
                self.next()?;
                let operand = self.parse_unary()?;
                let operand = self.require(operand)?;
                Ok(Some(Expr::Unary(Box::new(UnaryExpr {
                    span: self.span_from(tok.start),
                    op: tok.text,
                    operand,
                }))))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.next()?;
                let operand = self.parse_unary()?;
                let operand = self.require(operand)?;
                check_update_target(&operand)?;
                Ok(Some(Expr::Update(Box::new(UpdateExpr {
                    span: self.span_from(tok.start),
                    op: tok.text,
                    prefix: true,
                    operand,
                }))))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parse calls, member access and indexing, then at most one postfix
    /// `++`/`--` on the same line.
    fn parse_postfix(&mut self) -> PResult<Option<Expr>> {
        let start = self.peek()?.start;
        let Some(mut expr) = self.parse_primary()? else {
            return Ok(None);
        };

        // `()` only makes sense as an empty arrow parameter list
        if let Expr::NoArg(_) = expr {
            let tok = self.peek()?;
            if tok.kind != TokenKind::Arrow {
                return Err(ParseError::new(
                    ErrorCode::Expected,
                    &["=>", &describe(tok)],
                    token_span(tok),
                ));
            }
            return Ok(Some(expr));
        }

        loop {
            match self.peek_kind()? {
                TokenKind::LParen => {
                    self.next()?;
                    let args = self.parse_arguments()?;
                    expr = Expr::Call(Box::new(CallExpr {
                        span: self.span_from(start),
                        callee: expr,
                        args,
                    }));
                }
                TokenKind::Period => {
                    self.next()?;
                    let property = self.expect_property_name()?;
                    expr = Expr::Member(Box::new(MemberExpr {
                        span: self.span_from(start),
                        object: expr,
                        property,
                        optional: false,
                    }));
                }
                TokenKind::QuestionDot => {
                    self.next()?;
                    if self.eat(TokenKind::LBracket)?.is_some() {
                        let index = self.parse_index()?;
                        expr = Expr::Index(Box::new(IndexExpr {
                            span: self.span_from(start),
                            object: expr,
                            index,
                            optional: true,
                        }));
                    } else {
                        let property = self.expect_property_name()?;
                        expr = Expr::Member(Box::new(MemberExpr {
                            span: self.span_from(start),
                            object: expr,
                            property,
                            optional: true,
                        }));
                    }
                }
                TokenKind::LBracket => {
                    self.next()?;
                    let index = self.parse_index()?;
                    expr = Expr::Index(Box::new(IndexExpr {
                        span: self.span_from(start),
                        object: expr,
                        index,
                        optional: false,
                    }));
                }
                _ => break,
            }
        }

        let tok = self.peek()?;
        if matches!(tok.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) && !tok.newline_before {
            let op = self.next()?;
            check_update_target(&expr)?;
            expr = Expr::Update(Box::new(UpdateExpr {
                span: self.span_from(start),
                op: op.text,
                prefix: false,
                operand: expr,
            }));
        }
        Ok(Some(expr))
    }

    /// Parse call arguments after `(`, through the closing `)`.
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        if self.eat(TokenKind::RParen)?.is_some() {
            return Ok(Vec::new());
        }
        let start = self.peek()?.start;
        let (args, loose) = self.parse_list()?;
        if loose {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                &[","],
                self.span_from(start),
            ));
        }
        if args.is_empty() {
            return Err(self.unexpected_here());
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// Parse the index expression after `[`, through the closing `]`.
    fn parse_index(&mut self) -> PResult<Expr> {
        let index = self.parse_sequence(true)?;
        let index = self.require(index)?;
        self.expect(TokenKind::RBracket)?;
        Ok(index)
    }

    /// Property names after `.` may be any identifier or keyword.
    fn expect_property_name(&mut self) -> PResult<String> {
        let tok = self.peek()?;
        if tok.kind.is_keyword_like() {
            return Ok(self.next()?.text);
        }
        Err(ParseError::new(
            ErrorCode::Expected,
            &["property name", &describe(tok)],
            token_span(tok),
        ))
    }

    // ========================================================================
    // Primary Expressions
    // ========================================================================

    pub(crate) fn parse_primary(&mut self) -> PResult<Option<Expr>> {
        let tok = self.peek()?.clone();
        trace!(kind = ?tok.kind, pos = tok.start.char, "parse_primary");

        let literal = |value: LiteralValue| -> PResult<Option<Expr>> {
            Ok(Some(Expr::Literal(Literal {
                span: token_span(&tok),
                value,
            })))
        };

        match tok.kind {
            TokenKind::LParen => self.parse_parenthesized().map(Some),
            TokenKind::LBracket => self.parse_array_literal().map(Some),
            TokenKind::LBrace => self.parse_object_literal().map(Some),
            TokenKind::Slash | TokenKind::SlashEquals => self.parse_regex().map(Some),
            TokenKind::Ident => {
                self.next()?;
                Ok(Some(Expr::Ident(Ident::new(token_span(&tok), tok.text.clone()))))
            }
            TokenKind::Global => {
                self.next()?;
                self.expect(TokenKind::Period)?;
                let name = self.expect_property_name()?;
                Ok(Some(Expr::Ident(Ident {
                    span: self.span_from(tok.start),
                    name,
                    global: true,
                    parens: 0,
                })))
            }
            TokenKind::True | TokenKind::False => {
                self.next()?;
                literal(LiteralValue::Bool(tok.kind == TokenKind::True))
            }
            TokenKind::Null => {
                self.next()?;
                literal(LiteralValue::Null)
            }
            TokenKind::Undefined => {
                self.next()?;
                literal(LiteralValue::Undefined)
            }
            TokenKind::Infinity => {
                self.next()?;
                literal(LiteralValue::Infinity)
            }
            TokenKind::NaN => {
                self.next()?;
                literal(LiteralValue::NaN)
            }
            kind if kind.is_number() => {
                self.next()?;
                let value = decode_number(kind, &tok.text).map_err(|code| {
                    ParseError::new(
                        code,
                        &[&format!("invalid number literal '{}'", tok.text)],
                        token_span(&tok),
                    )
                })?;
                literal(value)
            }
            TokenKind::String => {
                self.next()?;
                literal(LiteralValue::String(decode_string(&tok.text)))
            }
            _ => Ok(None),
        }
    }

    /// Parse `( ... )`. Empty parentheses produce a [`NoArg`]; otherwise the
    /// inner expression's parenthesization count goes up by one.
    fn parse_parenthesized(&mut self) -> PResult<Expr> {
        let open = self.next()?; // consume '('
        if self.eat(TokenKind::RParen)?.is_some() {
            return Ok(Expr::NoArg(NoArg {
                span: self.span_from(open.start),
                parens: 1,
            }));
        }

        let inner = self.parse_sequence(true)?;
        let mut inner = self.require(inner)?;
        self.expect(TokenKind::RParen)?;
        inner.add_parens();
        Ok(inner)
    }

    /// Parse `[ ... ]`. A literal with empty slots is returned directly as an
    /// [`ArrayPattern`].
    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let open = self.next()?; // consume '['
        let (elements, loose) = if self.peek_is(TokenKind::RBracket)? {
            (Vec::new(), false)
        } else {
            self.parse_list()?
        };
        self.expect(TokenKind::RBracket)?;

        let arr = ArrayLit {
            span: self.span_from(open.start),
            elements,
            parens: 0,
        };
        if loose {
            let span = arr.span;
            let pattern = to_array_pattern(arr).map_err(|code| ParseError::new(code, &[], span))?;
            return Ok(Expr::ArrayPattern(pattern));
        }
        Ok(Expr::Array(arr))
    }

    /// Parse `{ ... }` with spread, shorthand, computed and literal keys.
    fn parse_object_literal(&mut self) -> PResult<Expr> {
        let open = self.next()?; // consume '{'
        let mut properties = Vec::new();

        while !self.peek_is(TokenKind::RBrace)? {
            if self.eat(TokenKind::Spread)?.is_some() {
                let argument = self.parse_assign()?;
                properties.push(Property::Spread(self.require(argument)?));
            } else {
                properties.push(self.parse_property()?);
            }

            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Expr::Object(ObjectLit {
            span: self.span_from(open.start),
            properties,
            parens: 0,
        }))
    }

    fn parse_property(&mut self) -> PResult<Property> {
        let tok = self.next()?;
        let span = token_span(&tok);
        let (key, computed) = match tok.kind {
            TokenKind::LBracket => {
                let key = self.parse_assign()?;
                let key = self.require(key)?;
                self.expect(TokenKind::RBracket)?;
                (key, true)
            }
            TokenKind::String => {
                let value = LiteralValue::String(decode_string(&tok.text));
                (Expr::Literal(Literal { span, value }), false)
            }
            kind if kind.is_number() => {
                let value = decode_number(kind, &tok.text).map_err(|code| {
                    ParseError::new(
                        code,
                        &[&format!("invalid number literal '{}'", tok.text)],
                        span,
                    )
                })?;
                (Expr::Literal(Literal { span, value }), false)
            }
            kind if kind.is_keyword_like() => (Expr::Ident(Ident::new(span, tok.text.clone())), false),
            _ => return Err(unexpected(&tok)),
        };

        if self.eat(TokenKind::Colon)?.is_some() {
            let value = self.parse_assign()?;
            let value = self.require(value)?;
            return Ok(Property::Pair {
                key,
                value,
                computed,
            });
        }

        // shorthand `{ name }`
        if tok.kind == TokenKind::Ident {
            return Ok(Property::Pair {
                value: key.clone(),
                key,
                computed: false,
            });
        }

        let next = self.peek()?;
        Err(ParseError::new(
            ErrorCode::Expected,
            &[":", &describe(next)],
            token_span(next),
        ))
    }

    /// Rescan the current `/` or `/=` as a regular expression literal.
    fn parse_regex(&mut self) -> PResult<Expr> {
        self.tokens.rescan_regex()?;
        let tok = self.next()?;
        let body = tok.text.strip_prefix('/').unwrap_or(&tok.text);
        let (pattern, flags) = body.rsplit_once('/').unwrap_or((body, ""));
        Ok(Expr::Literal(Literal {
            span: token_span(&tok),
            value: LiteralValue::Regex {
                pattern: pattern.to_string(),
                flags: flags.to_string(),
            },
        }))
    }
}

fn binary(op: String, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::Binary(Box::new(BinaryExpr {
        span,
        op,
        left,
        right,
    }))
}

/// Attach `right` as the new innermost operand of a chain of `depth` `**`
/// nodes, so `a ** b ** c` groups as `a ** (b ** c)`.
fn rotate_pow(left: Expr, op: String, right: Expr, depth: usize) -> Expr {
    match left {
        Expr::Binary(bin) if depth > 0 => {
            let BinaryExpr {
                span,
                op: outer_op,
                left: base,
                right: inner,
            } = *bin;
            let inner = rotate_pow(inner, op, right, depth - 1);
            Expr::Binary(Box::new(BinaryExpr {
                span: Span::new(span.start, inner.end()),
                op: outer_op,
                left: base,
                right: inner,
            }))
        }
        left => {
            let span = left.span().to(right.span());
            binary(op, left, right, span)
        }
    }
}

fn check_update_target(expr: &Expr) -> PResult<()> {
    match expr {
        Expr::Ident(_) | Expr::Member(_) | Expr::Index(_) => Ok(()),
        _ => Err(ParseError::new(
            ErrorCode::InvalidAssignmentTarget,
            &[],
            expr.span(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_expr(input: &str) -> Expr {
        let mut parser = Parser::new(input);
        match parser.parse_expr(true) {
            Ok(expr) => expr,
            Err(err) => panic!("parse of {input:?} failed: {err}"),
        }
    }

    fn parse_err(input: &str) -> ParseError {
        let mut parser = Parser::new(input);
        match parser.parse_expr(true) {
            Ok(expr) => panic!("expected {input:?} to fail, got {expr}"),
            Err(err) => err,
        }
    }

    /// Fully parenthesized rendering of the parsed expression.
    fn grouped(input: &str) -> String {
        parse_expr(input).to_string()
    }

    // =========================================================================
    // Precedence
    // =========================================================================

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(grouped("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(grouped("1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(grouped("a - b - c"), "((a - b) - c)");
        assert_eq!(grouped("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn test_power_right_associative() {
        assert_eq!(grouped("2 ** 3 ** 2"), "(2 ** (3 ** 2))");
        assert_eq!(grouped("a ** b ** c ** d"), "(a ** (b ** (c ** d)))");
        assert_eq!(grouped("(a ** b) ** c"), "((a ** b) ** c)");
        assert_eq!(grouped("a * b ** c"), "(a * (b ** c))");
    }

    #[test]
    fn test_logical_and_nullish() {
        assert_eq!(grouped("a || b && c"), "(a || (b && c))");
        assert_eq!(grouped("a ?? b || c"), "(a ?? (b || c))");
        assert_eq!(grouped("a | b ^ c & d"), "(a | (b ^ (c & d)))");
    }

    #[test]
    fn test_comparison_levels() {
        assert_eq!(grouped("a == b < c"), "(a == (b < c))");
        assert_eq!(grouped("a << 1 < b"), "((a << 1) < b)");
        assert_eq!(grouped("k in obj === true"), "((k in obj) === true)");
        assert_eq!(grouped("x instanceof Y"), "(x instanceof Y)");
        assert_eq!(grouped("a >>> 2 + 1"), "(a >>> (2 + 1))");
    }

    #[test]
    fn test_unary() {
        assert_eq!(grouped("-a * b"), "((-a) * b)");
        assert_eq!(grouped("!a && b"), "((!a) && b)");
        assert_eq!(grouped("typeof x === 'string'"), "((typeof x) === \"string\")");
        assert_eq!(grouped("~~x"), "(~(~x))");
    }

    #[test]
    fn test_update_expressions() {
        assert_eq!(grouped("++i"), "(++i)");
        assert_eq!(grouped("i--"), "(i--)");
        assert_eq!(grouped("a.b++"), "(a.b++)");
        assert_eq!(parse_err("1++").code, ErrorCode::InvalidAssignmentTarget);
        assert_eq!(parse_err("++f()").code, ErrorCode::InvalidAssignmentTarget);
    }

    #[test]
    fn test_postfix_not_after_newline() {
        let mut parser = Parser::new("a\n++b");
        let expr = parser.parse_expr(true).unwrap();
        assert!(matches!(expr, Expr::Ident(_)));
        assert_eq!(parser.tail(), "++b");
    }

    // =========================================================================
    // Assignment, Conditional, Sequence
    // =========================================================================

    #[test]
    fn test_conditional() {
        assert_eq!(grouped("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
        assert_eq!(grouped("a || b ? 1 : 2"), "((a || b) ? 1 : 2)");
    }

    #[test]
    fn test_assignment_right_associative() {
        assert_eq!(grouped("a = b = c"), "(a = (b = c))");
        assert_eq!(grouped("x += y * 2"), "(x += (y * 2))");
        assert_eq!(grouped("x ??= y"), "(x ??= y)");
        assert_eq!(grouped("o.p >>>= 1"), "(o.p >>>= 1)");
    }

    #[test]
    fn test_destructuring_assignment() {
        if let Expr::Assign(assign) = parse_expr("[a, b] = [b, a]") {
            assert!(matches!(assign.target, Expr::ArrayPattern(_)));
            assert!(matches!(assign.value, Expr::Array(_)));
        } else {
            panic!("Expected assignment");
        }
        if let Expr::Assign(assign) = parse_expr("({ a, b: c } = obj)") {
            assert!(matches!(assign.target, Expr::ObjectPattern(_)));
        } else {
            panic!("Expected assignment");
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(parse_err("1 = 2").code, ErrorCode::InvalidAssignmentTarget);
        assert_eq!(parse_err("a + b = c").code, ErrorCode::InvalidAssignmentTarget);
        assert_eq!(parse_err("[a] += 1").code, ErrorCode::InvalidAssignmentTarget);
    }

    #[test]
    fn test_sequence() {
        if let Expr::Sequence(seq) = parse_expr("a, b, c") {
            assert_eq!(seq.exprs.len(), 3);
            assert!(!seq.loose);
        } else {
            panic!("Expected sequence");
        }

        let mut parser = Parser::new("a, b");
        assert!(matches!(parser.parse_expr(false), Ok(Expr::Ident(_))));
        assert_eq!(parser.tail(), ", b");
    }

    #[test]
    fn test_loose_sequence_becomes_pattern() {
        if let Expr::ArrayPattern(p) = parse_expr("a, , b") {
            assert_eq!(p.elements.len(), 3);
            assert!(p.elements[1].is_none());
        } else {
            panic!("Expected array pattern");
        }
        assert_eq!(parse_err("1, , 2").code, ErrorCode::InvalidDestructure);
    }

    #[test]
    fn test_spread() {
        if let Expr::Call(call) = parse_expr("f(a, ...rest)") {
            assert_eq!(call.args.len(), 2);
            assert!(matches!(call.args[1], Expr::Spread(_)));
        } else {
            panic!("Expected call");
        }
    }

    // =========================================================================
    // Arrow Functions
    // =========================================================================

    #[test]
    fn test_arrow_functions() {
        if let Expr::Arrow(arrow) = parse_expr("x => x * 2") {
            assert_eq!(arrow.params.len(), 1);
            assert!(matches!(&arrow.body, Stmt::Return(r) if r.value.is_some()));
        } else {
            panic!("Expected arrow");
        }

        if let Expr::Arrow(arrow) = parse_expr("() => { go() }") {
            assert!(arrow.params.is_empty());
            assert!(matches!(arrow.body, Stmt::Block(_)));
        } else {
            panic!("Expected arrow");
        }

        if let Expr::Arrow(arrow) = parse_expr("(a, b) => a + b") {
            assert_eq!(arrow.params.len(), 2);
        } else {
            panic!("Expected arrow");
        }
    }

    #[test]
    fn test_arrow_destructured_params() {
        if let Expr::Arrow(arrow) = parse_expr("(a, {b}, [c]) => a") {
            assert_eq!(arrow.params.len(), 3);
            assert!(matches!(arrow.params[1], Pattern::Object(_)));
            assert!(matches!(arrow.params[2], Pattern::Array(_)));
        } else {
            panic!("Expected arrow");
        }

        if let Expr::Arrow(arrow) = parse_expr("({ x, y: [z] }) => z") {
            assert_eq!(arrow.params.len(), 1);
        } else {
            panic!("Expected arrow");
        }
    }

    #[test]
    fn test_invalid_arrow_params() {
        assert_eq!(parse_err("(a + 1) => a").code, ErrorCode::InvalidParameterList);
        assert_eq!(parse_err("((a)) => a").code, ErrorCode::InvalidParameterList);
        assert_eq!(parse_err("(a, (b)) => a").code, ErrorCode::InvalidParameterList);
        assert_eq!(parse_err("(a, 1) => a").code, ErrorCode::InvalidParameterList);
    }

    #[test]
    fn test_nested_arrow() {
        assert_eq!(grouped("a => b => a + b").matches("=>").count(), 1);
        if let Expr::Arrow(outer) = parse_expr("a => b => a + b") {
            if let Stmt::Return(ret) = &outer.body {
                assert!(matches!(ret.value, Some(Expr::Arrow(_))));
            } else {
                panic!("Expected return body");
            }
        } else {
            panic!("Expected arrow");
        }
    }

    #[test]
    fn test_empty_parens_need_arrow() {
        let err = parse_err("() + 1");
        assert_eq!(err.code, ErrorCode::Expected);
        assert_eq!(err.text, "expected '=>' but found '+'");
    }

    // =========================================================================
    // Member Access and Calls
    // =========================================================================

    #[test]
    fn test_member_chain() {
        assert_eq!(grouped("a.b.c"), "a.b.c");
        assert_eq!(grouped("a?.b"), "a?.b");
        assert_eq!(grouped("a?.[0]"), "a?.[0]");
        assert_eq!(grouped("a.b(c)[d]"), "a.b(c)[d]");
        assert_eq!(grouped("a.default.if"), "a.default.if");
    }

    #[test]
    fn test_calls() {
        if let Expr::Call(call) = parse_expr("f()") {
            assert!(call.args.is_empty());
        } else {
            panic!("Expected call");
        }
        if let Expr::Call(call) = parse_expr("f(a, b + 1, c)") {
            assert_eq!(call.args.len(), 3);
        } else {
            panic!("Expected call");
        }
        if let Expr::Call(call) = parse_expr("f(a,)") {
            assert_eq!(call.args.len(), 1);
        } else {
            panic!("Expected call");
        }
        assert_eq!(parse_err("f(a,,b)").code, ErrorCode::UnexpectedToken);
    }

    #[test]
    fn test_member_requires_name() {
        let err = parse_err("a.+b");
        assert_eq!(err.code, ErrorCode::Expected);
    }

    // =========================================================================
    // Primary Expressions
    // =========================================================================

    #[test]
    fn test_literals() {
        assert!(matches!(parse_expr("true"), Expr::Literal(Literal { value: LiteralValue::Bool(true), .. })));
        assert!(matches!(parse_expr("null"), Expr::Literal(Literal { value: LiteralValue::Null, .. })));
        assert!(matches!(parse_expr("undefined"), Expr::Literal(Literal { value: LiteralValue::Undefined, .. })));
        assert!(matches!(parse_expr("Infinity"), Expr::Literal(Literal { value: LiteralValue::Infinity, .. })));
        assert!(matches!(parse_expr("NaN"), Expr::Literal(Literal { value: LiteralValue::NaN, .. })));
        assert!(matches!(parse_expr("0xff"), Expr::Literal(Literal { value: LiteralValue::Number(n), .. }) if n == 255.0));
        assert!(matches!(parse_expr("'a\\tb'"), Expr::Literal(Literal { value: LiteralValue::String(ref s), .. }) if s == "a\tb"));
    }

    #[test]
    fn test_global_identifier() {
        if let Expr::Ident(id) = parse_expr("global.window") {
            assert!(id.global);
            assert_eq!(id.name, "window");
        } else {
            panic!("Expected identifier");
        }
        assert_eq!(parse_err("global").code, ErrorCode::Expected);
    }

    #[test]
    fn test_array_literal() {
        if let Expr::Array(arr) = parse_expr("[1, 'two', [3]]") {
            assert_eq!(arr.elements.len(), 3);
        } else {
            panic!("Expected array");
        }
        assert!(matches!(parse_expr("[]"), Expr::Array(ref a) if a.elements.is_empty()));
        assert!(matches!(parse_expr("[a, b,]"), Expr::Array(ref a) if a.elements.len() == 2));
    }

    #[test]
    fn test_array_with_holes() {
        if let Expr::ArrayPattern(p) = parse_expr("[a, , b]") {
            assert_eq!(p.elements.len(), 3);
            assert!(p.elements[0].is_some());
            assert!(p.elements[1].is_none());
            assert!(p.elements[2].is_some());
        } else {
            panic!("Expected array pattern");
        }
        assert_eq!(parse_err("[1, , 2]").code, ErrorCode::InvalidDestructure);
    }

    #[test]
    fn test_object_literal() {
        if let Expr::Object(obj) = parse_expr("({ a: 1, 'b': 2, 3: c, [k]: v, d, ...rest, if: 0 })") {
            assert_eq!(obj.properties.len(), 7);
            assert!(matches!(&obj.properties[3], Property::Pair { computed: true, .. }));
            assert!(matches!(&obj.properties[4], Property::Pair { key: Expr::Ident(k), value: Expr::Ident(v), .. } if k.name == "d" && v.name == "d"));
            assert!(matches!(&obj.properties[5], Property::Spread(_)));
            assert_eq!(obj.parens, 1);
        } else {
            panic!("Expected object");
        }
        assert!(matches!(parse_expr("{}"), Expr::Object(ref o) if o.properties.is_empty()));
    }

    #[test]
    fn test_object_shorthand_requires_identifier() {
        assert_eq!(parse_err("{ 'a' }").code, ErrorCode::Expected);
        assert_eq!(parse_err("{ if }").code, ErrorCode::Expected);
    }

    #[test]
    fn test_regex_literal() {
        if let Expr::Literal(lit) = parse_expr("/ab+c/gi") {
            assert_eq!(
                lit.value,
                LiteralValue::Regex {
                    pattern: "ab+c".to_string(),
                    flags: "gi".to_string()
                }
            );
        } else {
            panic!("Expected regex");
        }
        assert_eq!(grouped("/=/.test(s)"), "/=/.test(s)");
        assert_eq!(grouped("a / b"), "(a / b)");
    }

    #[test]
    fn test_unterminated_regex() {
        assert_eq!(parse_err("/abc").code, ErrorCode::InvalidRegex);
    }

    #[test]
    fn test_invalid_number_literal() {
        let err = parse_err("0x");
        assert_eq!(err.code, ErrorCode::Lexical);
    }

    #[test]
    fn test_spans() {
        let expr = parse_expr("foo + bar");
        assert_eq!(expr.pos().char, 0);
        assert_eq!(expr.end().char, 9);
        if let Expr::Binary(bin) = expr {
            assert_eq!(bin.right.pos().char, 6);
        } else {
            panic!("Expected binary");
        }

        let expr = parse_expr("(a + b) * c");
        assert_eq!(expr.pos().char, 0);
        assert_eq!(expr.end().char, 11);
    }
}
