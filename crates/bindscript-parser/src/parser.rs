//! Recursive-descent parser for bindscript.
//!
//! Statement parsing lives here; the expression precedence chain is in
//! `expr.rs`. Internal parse functions return `Ok(None)` when the current
//! token cannot start the construct, and `Err` for the first syntax error,
//! which aborts the whole parse.

use bindscript_lexer::{Position, Token, TokenKind, TokenSource};
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{ErrorCode, ParseError};
use crate::literal::decode_string;
use crate::pattern::{to_params, to_pattern};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Parser for bindscript source code.
pub struct Parser {
    pub(crate) tokens: TokenSource,
    errors: Vec<ParseError>,
    statement_level: usize,
}

impl Parser {
    /// Create a new parser for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            tokens: TokenSource::new(source),
            errors: Vec::new(),
            statement_level: 0,
        }
    }

    /// Start over on a new source. Errors from earlier parses are dropped.
    pub fn set_source(self, source: &str) -> Parser {
        Parser::new(source)
    }

    /// Parse statements until end of input.
    pub fn parse_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        debug!("parse_statements");
        let result = self.parse_program();
        self.record(result)
    }

    /// Parse a single expression. Parsing stops after the expression; any
    /// remaining input is available through [`Parser::tail`].
    pub fn parse_expr(&mut self, allow_sequence: bool) -> Result<Expr, ParseError> {
        debug!(allow_sequence, "parse_expr");
        // statements inside arrow bodies are never at the top level
        self.statement_level += 1;
        let result = match self.parse_sequence(allow_sequence) {
            Ok(Some(expr)) => Ok(expr),
            Ok(None) => Err(self.unexpected_here()),
            Err(err) => Err(err),
        };
        self.statement_level -= 1;
        self.record(result)
    }

    /// Diagnostics produced so far. Parsing stops at the first error, so this
    /// holds at most one entry per parse call.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Source text that has not been consumed.
    pub fn tail(&self) -> String {
        self.tokens.tail()
    }

    fn record<T>(&mut self, result: PResult<T>) -> PResult<T> {
        if let Err(err) = &result {
            debug!(
                code = ?err.code,
                line = err.span.start.line_number(),
                column = err.span.start.column_number(),
                "{}",
                err.text
            );
            self.errors.push(err.clone());
        }
        result
    }

    // ========================================================================
    // Token Helpers
    // ========================================================================

    pub(crate) fn peek(&mut self) -> PResult<&Token> {
        Ok(self.tokens.peek()?)
    }

    pub(crate) fn peek_kind(&mut self) -> PResult<TokenKind> {
        Ok(self.tokens.peek()?.kind)
    }

    pub(crate) fn peek_is(&mut self, kind: TokenKind) -> PResult<bool> {
        Ok(self.peek_kind()? == kind)
    }

    pub(crate) fn next(&mut self) -> PResult<Token> {
        Ok(self.tokens.get()?)
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> PResult<Option<Token>> {
        if self.peek_is(kind)? {
            return Ok(Some(self.next()?));
        }
        Ok(None)
    }

    /// Consume the next token, which must have the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        let tok = self.peek()?;
        if tok.kind == kind {
            return self.next();
        }
        Err(ParseError::new(
            ErrorCode::Expected,
            &[&kind.to_string(), &describe(tok)],
            token_span(tok),
        ))
    }

    /// Consume an identifier token.
    pub(crate) fn expect_ident(&mut self) -> PResult<Ident> {
        let tok = self.expect(TokenKind::Ident)?;
        Ok(Ident::new(token_span(&tok), tok.text))
    }

    /// Consume an identifier whose text is the contextual word `word`.
    fn expect_word(&mut self, word: &str) -> PResult<Token> {
        let tok = self.peek()?;
        if tok.is_word(word) {
            return self.next();
        }
        Err(ParseError::new(
            ErrorCode::Expected,
            &[word, &describe(tok)],
            token_span(tok),
        ))
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.tokens.prev_end())
    }

    /// An `UnexpectedToken` error for the next token.
    pub(crate) fn unexpected_here(&mut self) -> ParseError {
        match self.tokens.peek() {
            Ok(tok) => unexpected(tok),
            Err(err) => err.into(),
        }
    }

    /// Unwrap a construct that must be present at this point.
    pub(crate) fn require<T>(&mut self, node: Option<T>) -> PResult<T> {
        match node {
            Some(node) => Ok(node),
            None => Err(self.unexpected_here()),
        }
    }

    // ========================================================================
    // Statement Parsing
    // ========================================================================

    fn parse_program(&mut self) -> PResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.peek_is(TokenKind::Eof)? {
            let stmt = self.parse_statement()?;
            body.push(self.require(stmt)?);
        }
        Ok(body)
    }

    pub(crate) fn parse_statement(&mut self) -> PResult<Option<Stmt>> {
        Ok(self.parse_terminated()?.map(|(stmt, _)| stmt))
    }

    /// Parse a statement and its optional `;`. The flag reports whether the
    /// statement ended with a `;`, including one consumed by a nested body
    /// as in `while (x) y;`.
    fn parse_terminated(&mut self) -> PResult<Option<(Stmt, bool)>> {
        self.statement_level += 1;
        let result = self.parse_statement_body();
        self.statement_level -= 1;

        let Some(stmt) = result? else {
            return Ok(None);
        };
        if !matches!(stmt, Stmt::Empty(_))
            && self.eat(TokenKind::Semicolon)?.is_none()
            && needs_terminator(&stmt)
        {
            self.check_statement_end()?;
        }
        let terminated = self.tokens.prev_kind() == Some(TokenKind::Semicolon);
        Ok(Some((stmt, terminated)))
    }

    /// A simple statement without `;` must be followed by a line break, `}`
    /// or the end of input.
    fn check_statement_end(&mut self) -> PResult<()> {
        let tok = self.peek()?;
        if tok.newline_before || matches!(tok.kind, TokenKind::RBrace | TokenKind::Eof) {
            return Ok(());
        }
        Err(ParseError::new(
            ErrorCode::ExpectedOrEnd,
            &[";", &describe(tok)],
            token_span(tok),
        ))
    }

    fn parse_statement_body(&mut self) -> PResult<Option<Stmt>> {
        let kind = self.peek_kind()?;
        trace!(?kind, level = self.statement_level, "statement");

        let stmt = match kind {
            TokenKind::Semicolon => {
                let tok = self.next()?;
                Stmt::Empty(EmptyStmt {
                    span: token_span(&tok),
                })
            }
            TokenKind::LBrace => Stmt::Block(self.parse_block()?),
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                Stmt::Decl(self.parse_declaration(false)?)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Do => self.parse_do_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::Break => {
                let tok = self.next()?;
                Stmt::Break(BreakStmt {
                    span: token_span(&tok),
                })
            }
            TokenKind::Continue => {
                let tok = self.next()?;
                Stmt::Continue(ContinueStmt {
                    span: token_span(&tok),
                })
            }
            TokenKind::Throw => self.parse_throw()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::Function => Stmt::Function(self.parse_function(None)?),
            TokenKind::Import => self.parse_import()?,
            TokenKind::Export => self.parse_export()?,
            _ => {
                let start = self.peek()?.start;
                let Some(expr) = self.parse_sequence(true)? else {
                    return Ok(None);
                };
                Stmt::Expr(ExprStmt {
                    span: self.span_from(start),
                    expr,
                })
            }
        };
        Ok(Some(stmt))
    }

    /// Parse a sub-statement that must be present, such as a loop body.
    fn parse_required_statement(&mut self) -> PResult<(Stmt, bool)> {
        let stmt = self.parse_terminated()?;
        self.require(stmt)
    }

    pub(crate) fn parse_block(&mut self) -> PResult<BlockStmt> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.peek_is(TokenKind::RBrace)? {
            let stmt = self.parse_statement()?;
            body.push(self.require(stmt)?);
        }
        self.next()?; // consume '}'
        Ok(BlockStmt {
            span: self.span_from(open.start),
            body,
        })
    }

    /// Parse `let`, `const` or `var` and its comma-separated declarators.
    /// Inside a `for (...)` header a `let` binding must be initialized.
    fn parse_declaration(&mut self, in_for: bool) -> PResult<DeclStmt> {
        let keyword = self.next()?;
        let kind = match keyword.kind {
            TokenKind::Const => DeclKind::Const,
            TokenKind::Var => DeclKind::Var,
            _ => DeclKind::Let,
        };

        let mut declarators = Vec::new();
        loop {
            let tok = self.peek()?.clone();
            let target = match tok.kind {
                TokenKind::Ident => {
                    self.next()?;
                    Pattern::Ident(Ident::new(token_span(&tok), tok.text))
                }
                TokenKind::LBracket | TokenKind::LBrace => {
                    let expr = self.parse_primary()?;
                    let expr = self.require(expr)?;
                    let span = expr.span();
                    to_pattern(expr).map_err(|code| ParseError::new(code, &[], span))?
                }
                _ => {
                    return Err(ParseError::new(
                        ErrorCode::InvalidDeclaration,
                        &[&describe(&tok)],
                        token_span(&tok),
                    ));
                }
            };

            let init = if self.eat(TokenKind::Assign)?.is_some() {
                let value = self.parse_assign()?;
                Some(self.require(value)?)
            } else {
                None
            };

            let span = self.span_from(tok.start);
            if init.is_none() {
                if !matches!(target, Pattern::Ident(_)) {
                    return Err(ParseError::new(
                        ErrorCode::MissingInitializer,
                        &["destructuring"],
                        span,
                    ));
                }
                if kind != DeclKind::Let {
                    return Err(ParseError::new(
                        ErrorCode::MissingInitializer,
                        &[&kind.to_string()],
                        span,
                    ));
                }
                if in_for {
                    return Err(ParseError::new(ErrorCode::ForLetWithoutInit, &[], span));
                }
            }

            declarators.push(Declarator { span, target, init });
            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }

        Ok(DeclStmt {
            span: self.span_from(keyword.start),
            kind,
            declarators,
        })
    }

    /// Parse `( expr )` as used by `if`, `while` and `switch`.
    fn parse_condition(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let test = self.parse_sequence(true)?;
        let test = self.require(test)?;
        self.expect(TokenKind::RParen)?;
        Ok(test)
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'if'
        let test = self.parse_condition()?;
        let (consequent, terminated) = self.parse_required_statement()?;

        // `else` only attaches to a block or an explicitly terminated branch.
        let can_bind_else = terminated || matches!(consequent, Stmt::Block(_));
        let alternate = if can_bind_else && self.eat(TokenKind::Else)?.is_some() {
            Some(self.parse_required_statement()?.0)
        } else {
            None
        };

        Ok(Stmt::If(Box::new(IfStmt {
            span: self.span_from(start),
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'while'
        let test = self.parse_condition()?;
        let (body, _) = self.parse_required_statement()?;
        Ok(Stmt::While(Box::new(WhileStmt {
            span: self.span_from(start),
            test,
            body,
        })))
    }

    fn parse_do_while(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'do'
        let (body, _) = self.parse_required_statement()?;
        self.expect(TokenKind::While)?;
        let test = self.parse_condition()?;
        Ok(Stmt::DoWhile(Box::new(DoWhileStmt {
            span: self.span_from(start),
            body,
            test,
        })))
    }

    /// Parse one of `for (x in obj)`, `for (x of iter)` (each optionally with
    /// `let`/`const`) or `for (init; test; update)`.
    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'for'
        self.expect(TokenKind::LParen)?;

        let (binding, offset) = match self.peek_kind()? {
            TokenKind::Let => (ForBinding::Let, 1),
            TokenKind::Const => (ForBinding::Const, 1),
            TokenKind::Ident => (ForBinding::None, 0),
            // no lookahead past a token that may start a regex
            _ => return self.parse_classic_for(start),
        };
        let is_name = self.tokens.peek_n(offset)?.kind == TokenKind::Ident;
        let after = self.tokens.peek_n(offset + 1)?;
        let is_in = after.kind == TokenKind::In;
        let is_of = after.is_word("of");

        if is_name && (is_in || is_of) {
            for _ in 0..offset {
                self.next()?; // consume 'let' / 'const'
            }
            let name = self.expect_ident()?;
            self.next()?; // consume 'in' / 'of'
            let object = self.parse_sequence(true)?;
            let object = self.require(object)?;
            self.expect(TokenKind::RParen)?;
            let (body, _) = self.parse_required_statement()?;

            let each = Box::new(ForEachStmt {
                span: self.span_from(start),
                binding,
                name,
                object,
                body,
            });
            return Ok(if is_in {
                Stmt::ForIn(each)
            } else {
                Stmt::ForOf(each)
            });
        }
        self.parse_classic_for(start)
    }

    /// Parse the rest of `for (init; test; update) body` after the `(`.
    fn parse_classic_for(&mut self, start: Position) -> PResult<Stmt> {
        let init = match self.peek_kind()? {
            TokenKind::Semicolon => None,
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                Some(ForInit::Decl(self.parse_declaration(true)?))
            }
            _ => {
                let expr = self.parse_sequence(true)?;
                Some(ForInit::Expr(self.require(expr)?))
            }
        };
        self.expect(TokenKind::Semicolon)?;

        let test = if self.peek_is(TokenKind::Semicolon)? {
            None
        } else {
            let expr = self.parse_sequence(true)?;
            Some(self.require(expr)?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.peek_is(TokenKind::RParen)? {
            None
        } else {
            let expr = self.parse_sequence(true)?;
            Some(self.require(expr)?)
        };
        self.expect(TokenKind::RParen)?;

        let (body, _) = self.parse_required_statement()?;
        Ok(Stmt::For(Box::new(ForStmt {
            span: self.span_from(start),
            init,
            test,
            update,
            body,
        })))
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'return'
        let tok = self.peek()?;
        let bare = tok.newline_before
            || matches!(
                tok.kind,
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            );
        let value = if bare {
            None
        } else {
            let expr = self.parse_sequence(true)?;
            Some(self.require(expr)?)
        };
        Ok(Stmt::Return(ReturnStmt {
            span: self.span_from(start),
            value,
        }))
    }

    fn parse_throw(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'throw'
        let value = self.parse_sequence(true)?;
        let value = self.require(value)?;
        Ok(Stmt::Throw(ThrowStmt {
            span: self.span_from(start),
            value,
        }))
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'try'
        let block = self.parse_block()?;

        let handler = match self.eat(TokenKind::Catch)? {
            Some(catch) => {
                let param = if self.eat(TokenKind::LParen)?.is_some() {
                    let name = self.expect_ident()?;
                    self.expect(TokenKind::RParen)?;
                    Some(name)
                } else if self.peek_is(TokenKind::Ident)? {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                let body = self.parse_block()?;
                Some(CatchClause {
                    span: self.span_from(catch.start),
                    param,
                    body,
                })
            }
            None => None,
        };

        let finalizer = match self.eat(TokenKind::Finally)? {
            Some(_) => Some(self.parse_block()?),
            None => None,
        };

        let span = self.span_from(start);
        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::new(ErrorCode::TryWithoutHandler, &[], span));
        }
        Ok(Stmt::Try(Box::new(TryStmt {
            span,
            block,
            handler,
            finalizer,
        })))
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'switch'
        let discriminant = self.parse_condition()?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        loop {
            let tok = self.next()?;
            let test = match tok.kind {
                TokenKind::RBrace => break,
                TokenKind::Case => {
                    let expr = self.parse_sequence(true)?;
                    Some(self.require(expr)?)
                }
                TokenKind::Default => {
                    if seen_default {
                        return Err(ParseError::new(
                            ErrorCode::DuplicateDefault,
                            &[],
                            token_span(&tok),
                        ));
                    }
                    seen_default = true;
                    None
                }
                _ => return Err(unexpected(&tok)),
            };
            self.expect(TokenKind::Colon)?;

            let mut body = Vec::new();
            while !matches!(
                self.peek_kind()?,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace
            ) {
                let stmt = self.parse_statement()?;
                body.push(self.require(stmt)?);
            }
            cases.push(SwitchCase {
                span: self.span_from(tok.start),
                test,
                body,
            });
        }

        Ok(Stmt::Switch(SwitchStmt {
            span: self.span_from(start),
            discriminant,
            cases,
        }))
    }

    /// Parse `function name(params) { body }`. `export_start` is the position
    /// of a preceding `export` keyword.
    fn parse_function(&mut self, export_start: Option<Position>) -> PResult<FunctionDecl> {
        let keyword = self.next()?; // consume 'function'
        let name = self.expect_ident()?;

        if !self.peek_is(TokenKind::LParen)? {
            let tok = self.peek()?;
            return Err(ParseError::new(
                ErrorCode::Expected,
                &["(", &describe(tok)],
                token_span(tok),
            ));
        }
        let params = self.parse_primary()?;
        let params = self.require(params)?;
        let params_span = params.span();
        let params =
            to_params(params).map_err(|code| ParseError::new(code, &[], params_span))?;

        let body = self.parse_block()?;
        Ok(FunctionDecl {
            span: self.span_from(export_start.unwrap_or(keyword.start)),
            name,
            params,
            body,
            exported: export_start.is_some(),
        })
    }

    fn parse_import(&mut self) -> PResult<Stmt> {
        let start = self.next()?.start; // consume 'import'
        self.expect(TokenKind::LBrace)?;

        let mut specifiers: Vec<ImportSpecifier> = Vec::new();
        while !self.peek_is(TokenKind::RBrace)? {
            let imported = self.expect_ident()?;
            let local = if self.peek()?.is_word("as") {
                self.next()?; // consume 'as'
                self.expect_ident()?
            } else {
                imported.clone()
            };

            if specifiers.iter().any(|s| s.local.name == local.name) {
                return Err(ParseError::new(
                    ErrorCode::DuplicateImport,
                    &[&local.name],
                    local.span,
                ));
            }
            specifiers.push(ImportSpecifier {
                span: self.span_from(imported.span.start),
                imported,
                local,
            });

            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        self.expect_word("from")?;
        let source = self.expect(TokenKind::String)?;
        Ok(Stmt::Import(ImportStmt {
            span: self.span_from(start),
            specifiers,
            source: decode_string(&source.text),
        }))
    }

    fn parse_export(&mut self) -> PResult<Stmt> {
        let export = self.next()?;
        if self.statement_level != 1 {
            return Err(ParseError::new(
                ErrorCode::ExportPlacement,
                &[],
                token_span(&export),
            ));
        }
        if !self.peek_is(TokenKind::Function)? {
            return Err(ParseError::new(
                ErrorCode::ExportTarget,
                &[],
                token_span(&export),
            ));
        }
        Ok(Stmt::Function(self.parse_function(Some(export.start))?))
    }
}

pub(crate) fn token_span(tok: &Token) -> Span {
    Span::new(tok.start, tok.end)
}

/// How a token is named in diagnostics.
pub(crate) fn describe(tok: &Token) -> String {
    match tok.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => tok.text.clone(),
    }
}

pub(crate) fn unexpected(tok: &Token) -> ParseError {
    ParseError::new(ErrorCode::UnexpectedToken, &[&describe(tok)], token_span(tok))
}

/// Statements that must end with `;`, a line break, `}` or end of input.
fn needs_terminator(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::Expr(_)
            | Stmt::Decl(_)
            | Stmt::Return(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Throw(_)
            | Stmt::Import(_)
    )
}

/// Parse source code into a list of statements.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    Parser::new(source).parse_statements()
}
