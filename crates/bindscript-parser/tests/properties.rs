//! Whole-parser properties checked through the public API.

use bindscript_parser::*;
use pretty_assertions::assert_eq;

fn stmts(source: &str) -> Vec<Stmt> {
    match Parser::new(source).parse_statements() {
        Ok(stmts) => stmts,
        Err(err) => panic!("parse of {:?} failed: {}", source, err),
    }
}

fn expr(source: &str) -> Expr {
    match Parser::new(source).parse_expr(true) {
        Ok(expr) => expr,
        Err(err) => panic!("parse of {:?} failed: {}", source, err),
    }
}

fn error_code(source: &str) -> ErrorCode {
    match Parser::new(source).parse_statements() {
        Ok(stmts) => panic!("expected {:?} to fail, got {:?}", source, stmts),
        Err(err) => err.code,
    }
}

fn string_value(source: &str) -> String {
    match expr(source) {
        Expr::Literal(Literal {
            value: LiteralValue::String(s),
            ..
        }) => s,
        other => panic!("Expected string literal, got {:?}", other),
    }
}

const SAMPLE: &str = r#"
import { format as fmt, clamp } from "util"

export function total(items, { rate }) {
  let sum = 0
  for (const item of items) {
    sum += item.price * item.qty
  }
  return sum * (1 + rate)
}

const [first, , third] = list
let label = user?.name ?? "anonymous"
if (count > 10) show(label); else hide()
switch (mode) {
  case "a": run(() => 1); break
  default: stop()
}
try { risky() } catch (e) { log(e.message) } finally { done = true }
"#;

#[test]
fn test_parse_is_idempotent() {
    let first = stmts(SAMPLE);
    let second = stmts(SAMPLE);
    assert_eq!(first, second);

    let mut parser = Parser::new(SAMPLE);
    let reused = parser.parse_statements().unwrap();
    let mut parser = parser.set_source(SAMPLE);
    assert_eq!(reused, parser.parse_statements().unwrap());
}

fn check_within(parent: Span, child: Span) {
    assert!(child.start <= child.end, "inverted span {:?}", child);
    assert!(
        parent.start <= child.start && child.end <= parent.end,
        "child {:?} escapes parent {:?}",
        child,
        parent
    );
}

fn check_expr(e: &Expr) {
    let span = e.span();
    assert!(span.start <= span.end, "inverted span {:?}", span);
    let mut child = |c: &Expr| {
        check_within(span, c.span());
        check_expr(c);
    };
    match e {
        Expr::Array(a) => a.elements.iter().for_each(&mut child),
        Expr::Sequence(s) => s.exprs.iter().for_each(&mut child),
        Expr::Object(o) => {
            for prop in &o.properties {
                match prop {
                    Property::Spread(v) => child(v),
                    Property::Pair { value, .. } => child(value),
                }
            }
        }
        Expr::Conditional(c) => {
            child(&c.test);
            child(&c.consequent);
            child(&c.alternate);
        }
        Expr::Assign(a) => {
            child(&a.target);
            child(&a.value);
        }
        Expr::Arrow(a) => {
            for p in &a.params {
                check_within(span, p.span());
            }
            check_within(span, a.body.span());
        }
        Expr::Spread(s) => child(&s.argument),
        Expr::Binary(b) => {
            child(&b.left);
            child(&b.right);
        }
        Expr::Unary(u) => child(&u.operand),
        Expr::Update(u) => child(&u.operand),
        Expr::Call(c) => {
            child(&c.callee);
            c.args.iter().for_each(&mut child);
        }
        Expr::Member(m) => child(&m.object),
        Expr::Index(i) => {
            child(&i.object);
            child(&i.index);
        }
        _ => {}
    }
}

fn check_stmt(s: &Stmt) {
    let span = s.span();
    assert!(span.start <= span.end, "inverted span {:?}", span);
    let expr_child = |e: &Expr| {
        check_within(span, e.span());
        check_expr(e);
    };
    let stmt_child = |c: &Stmt| {
        check_within(span, c.span());
        check_stmt(c);
    };
    match s {
        Stmt::Expr(e) => expr_child(&e.expr),
        Stmt::Decl(d) => {
            for decl in &d.declarators {
                check_within(span, decl.span);
                check_within(decl.span, decl.target.span());
                if let Some(init) = &decl.init {
                    expr_child(init);
                }
            }
        }
        Stmt::Block(b) => b.body.iter().for_each(stmt_child),
        Stmt::If(i) => {
            expr_child(&i.test);
            stmt_child(&i.consequent);
            if let Some(alt) = &i.alternate {
                stmt_child(alt);
            }
        }
        Stmt::While(w) => {
            expr_child(&w.test);
            stmt_child(&w.body);
        }
        Stmt::ForOf(f) | Stmt::ForIn(f) => {
            check_within(span, f.name.span);
            expr_child(&f.object);
            stmt_child(&f.body);
        }
        Stmt::Return(r) => {
            if let Some(v) = &r.value {
                expr_child(v);
            }
        }
        Stmt::Function(f) => {
            for p in &f.params {
                check_within(span, p.span());
            }
            f.body.body.iter().for_each(stmt_child);
        }
        Stmt::Try(t) => {
            t.block.body.iter().for_each(stmt_child);
            if let Some(fin) = &t.finalizer {
                check_within(span, fin.span);
            }
        }
        _ => {}
    }
}

#[test]
fn test_spans_are_ordered_and_nested() {
    let program = stmts(SAMPLE);
    for pair in program.windows(2) {
        assert!(pair[0].end() <= pair[1].pos());
    }
    program.iter().for_each(check_stmt);
}

#[test]
fn test_precedence() {
    assert_eq!(expr("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(expr("2 ** 3 ** 2").to_string(), "(2 ** (3 ** 2))");
    assert_eq!(expr("a || b && c").to_string(), "(a || (b && c))");
    assert_eq!(expr("a == b < c").to_string(), "(a == (b < c))");
    assert_eq!(expr("x = y ? 1 : 2").to_string(), "(x = (y ? 1 : 2))");
}

#[test]
fn test_elision_destructure() {
    let Expr::ArrayPattern(pattern) = expr("[a, , b]") else {
        panic!("Expected ArrayPattern");
    };
    assert_eq!(pattern.elements.len(), 3);
    assert!(pattern.elements[1].is_none());
    let binding = Pattern::Array(pattern.clone());
    let names: Vec<&str> = binding.bound_names();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_safe_integer_boundary() {
    match expr("9007199254740993") {
        Expr::Literal(Literal {
            value: LiteralValue::BigInt(n),
            ..
        }) => assert_eq!(n.to_string(), "9007199254740993"),
        other => panic!("Expected BigInt, got {:?}", other),
    }
    match expr("9007199254740991") {
        Expr::Literal(Literal {
            value: LiteralValue::Number(n),
            ..
        }) => assert_eq!(n, 9007199254740991.0),
        other => panic!("Expected Number, got {:?}", other),
    }
}

#[test]
fn test_string_escapes() {
    assert_eq!(string_value(r#""\u0041""#), "A");
    assert_eq!(string_value(r#""\uD83D\uDE00""#), "\u{1F600}");
    assert_eq!(string_value(r#""\u{1F600}""#), "\u{1F600}");
    assert_eq!(string_value(r#""😀""#), "\u{1F600}");
    assert_eq!(string_value(r#""\x4""#), "\u{4}");
    assert_eq!(string_value(r#"'tab\there'"#), "tab\there");
}

#[test]
fn test_arrow_parameter_validation() {
    let Expr::Arrow(arrow) = expr("(a, {b}, [c]) => a") else {
        panic!("Expected Arrow");
    };
    assert_eq!(arrow.params.len(), 3);
    assert!(matches!(arrow.params[0], Pattern::Ident(_)));
    assert!(matches!(arrow.params[1], Pattern::Object(_)));
    assert!(matches!(arrow.params[2], Pattern::Array(_)));

    let err = Parser::new("(a + 1) => a").parse_expr(true).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameterList);
}

#[test]
fn test_statement_errors() {
    assert_eq!(
        error_code("switch (x) { default: a(); default: b() }"),
        ErrorCode::DuplicateDefault
    );
    assert_eq!(error_code("try { a() }"), ErrorCode::TryWithoutHandler);
}

#[test]
fn test_for_forms() {
    let program = stmts("for (k in obj) {}\nfor (let v of list) {}\nfor (;;) break");
    assert!(matches!(&program[0], Stmt::ForIn(f) if f.binding == ForBinding::None));
    assert!(matches!(&program[1], Stmt::ForOf(f) if f.binding == ForBinding::Let));
    let Stmt::For(classic) = &program[2] else {
        panic!("Expected classic for");
    };
    assert!(classic.init.is_none() && classic.test.is_none() && classic.update.is_none());
}

#[test]
fn test_first_error_is_recorded_once() {
    let mut parser = Parser::new("let a = 1\nlet = 2\nlet = 3");
    let err = parser.parse_statements().unwrap_err();
    assert_eq!(parser.errors(), &[err.clone()]);
    assert_eq!(err.span.start.line_number(), 2);
}
