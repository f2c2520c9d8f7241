//! Conversion of already-parsed expressions into binding patterns.
//!
//! The parser cannot know that `(a, {b}, [c])` is a parameter list or that
//! `[x, y]` is a destructuring target until it sees the following `=>` or
//! `=`. Both cases parse an ordinary expression first and then run it
//! through the routines here.

use crate::ast::*;
use crate::error::ErrorCode;

/// Validate an expression as an arrow or function parameter list.
///
/// Accepts `()`, a bare or singly parenthesized identifier, or a singly
/// parenthesized sequence, object, array or pattern. Sequence members must be
/// unparenthesized identifiers, object/array literals or patterns.
pub fn to_params(expr: Expr) -> Result<Vec<Pattern>, ErrorCode> {
    match expr {
        Expr::NoArg(n) if n.parens == 1 => Ok(Vec::new()),
        Expr::Ident(id) if id.parens <= 1 && !id.global => Ok(vec![Pattern::Ident(id)]),
        Expr::Sequence(seq) if seq.parens == 1 => {
            seq.exprs.into_iter().map(to_param_element).collect()
        }
        e @ (Expr::Object(_) | Expr::Array(_) | Expr::ArrayPattern(_) | Expr::ObjectPattern(_))
            if e.parens() == 1 =>
        {
            let pattern = to_pattern(e).map_err(|_| ErrorCode::InvalidParameterList)?;
            Ok(vec![pattern])
        }
        _ => Err(ErrorCode::InvalidParameterList),
    }
}

fn to_param_element(expr: Expr) -> Result<Pattern, ErrorCode> {
    match expr {
        e @ (Expr::Ident(_)
        | Expr::Object(_)
        | Expr::Array(_)
        | Expr::ArrayPattern(_)
        | Expr::ObjectPattern(_))
            if e.parens() == 0 =>
        {
            to_pattern(e).map_err(|_| ErrorCode::InvalidParameterList)
        }
        _ => Err(ErrorCode::InvalidParameterList),
    }
}

/// Convert a single expression into a binding pattern.
pub fn to_pattern(expr: Expr) -> Result<Pattern, ErrorCode> {
    match expr {
        Expr::Ident(id) if !id.global => Ok(Pattern::Ident(Ident { parens: 0, ..id })),
        Expr::Object(obj) => to_object_pattern(obj).map(Pattern::Object),
        Expr::Array(arr) => to_array_pattern(arr).map(Pattern::Array),
        Expr::ArrayPattern(p) => Ok(Pattern::Array(p)),
        Expr::ObjectPattern(p) => Ok(Pattern::Object(p)),
        _ => Err(ErrorCode::InvalidDestructure),
    }
}

/// Convert an object literal into an object pattern. Every property must be
/// a plain `key` or `key: target` pair with an identifier key.
pub fn to_object_pattern(obj: ObjectLit) -> Result<ObjectPattern, ErrorCode> {
    let properties = obj
        .properties
        .into_iter()
        .map(|prop| match prop {
            Property::Pair {
                key: Expr::Ident(key),
                value,
                computed: false,
            } if !key.global => {
                let span = key.span.to(value.span());
                Ok(PropertyPattern {
                    span,
                    key: key.name,
                    value: to_pattern(value)?,
                })
            }
            _ => Err(ErrorCode::InvalidDestructure),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ObjectPattern {
        span: obj.span,
        properties,
        parens: obj.parens,
    })
}

/// Convert an array literal into an array pattern.
pub fn to_array_pattern(arr: ArrayLit) -> Result<ArrayPattern, ErrorCode> {
    array_pattern(arr.span, arr.elements, arr.parens)
}

/// Convert a sequence containing elided slots, like `a, , b`, into an array
/// pattern.
pub fn loose_sequence_to_pattern(seq: SequenceExpr) -> Result<ArrayPattern, ErrorCode> {
    array_pattern(seq.span, seq.exprs, seq.parens)
}

fn array_pattern(span: Span, elements: Vec<Expr>, parens: u32) -> Result<ArrayPattern, ErrorCode> {
    let elements = elements
        .into_iter()
        .map(|elem| match elem {
            Expr::NoArg(_) => Ok(None),
            other => to_pattern(other).map(Some),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ArrayPattern {
        span,
        elements,
        parens,
    })
}

/// Validate the left-hand side of an assignment. Plain `=` additionally
/// accepts object and array literals, which become destructuring patterns.
pub fn to_assign_target(expr: Expr, op: &str) -> Result<Expr, ErrorCode> {
    match expr {
        Expr::Ident(_) | Expr::Member(_) | Expr::Index(_) => Ok(expr),
        Expr::Object(_) | Expr::Array(_) | Expr::ArrayPattern(_) | Expr::ObjectPattern(_)
            if op == "=" =>
        {
            to_pattern(expr).map(Expr::from)
        }
        _ => Err(ErrorCode::InvalidAssignmentTarget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindscript_lexer::Position;

    fn sp() -> Span {
        Span::new(Position::default(), Position::default())
    }

    fn ident(name: &str) -> Ident {
        Ident::new(sp(), name)
    }

    fn ident_expr(name: &str, parens: u32) -> Expr {
        Expr::Ident(Ident {
            parens,
            ..ident(name)
        })
    }

    fn number(n: f64) -> Expr {
        Expr::Literal(Literal {
            span: sp(),
            value: LiteralValue::Number(n),
        })
    }

    fn shorthand(name: &str) -> Property {
        Property::Pair {
            key: ident_expr(name, 0),
            value: ident_expr(name, 0),
            computed: false,
        }
    }

    fn object(properties: Vec<Property>, parens: u32) -> Expr {
        Expr::Object(ObjectLit {
            span: sp(),
            properties,
            parens,
        })
    }

    fn array(elements: Vec<Expr>, parens: u32) -> Expr {
        Expr::Array(ArrayLit {
            span: sp(),
            elements,
            parens,
        })
    }

    fn sequence(exprs: Vec<Expr>, parens: u32) -> Expr {
        Expr::Sequence(SequenceExpr {
            span: sp(),
            exprs,
            loose: false,
            parens,
        })
    }

    #[test]
    fn test_empty_params() {
        let params = to_params(Expr::NoArg(NoArg { span: sp(), parens: 1 })).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_single_ident_param() {
        assert_eq!(to_params(ident_expr("x", 0)).unwrap().len(), 1);
        assert_eq!(to_params(ident_expr("x", 1)).unwrap().len(), 1);
        assert_eq!(
            to_params(ident_expr("x", 2)),
            Err(ErrorCode::InvalidParameterList)
        );
    }

    #[test]
    fn test_sequence_params() {
        let seq = sequence(
            vec![
                ident_expr("a", 0),
                object(vec![shorthand("b")], 0),
                array(vec![ident_expr("c", 0)], 0),
            ],
            1,
        );
        let params = to_params(seq).unwrap();
        assert_eq!(params.len(), 3);
        assert!(matches!(params[0], Pattern::Ident(_)));
        assert!(matches!(params[1], Pattern::Object(_)));
        assert!(matches!(params[2], Pattern::Array(_)));
    }

    #[test]
    fn test_sequence_requires_single_parens() {
        let seq = sequence(vec![ident_expr("a", 0), ident_expr("b", 0)], 2);
        assert_eq!(to_params(seq), Err(ErrorCode::InvalidParameterList));
    }

    #[test]
    fn test_parenthesized_member_rejected() {
        let seq = sequence(vec![ident_expr("a", 1), ident_expr("b", 0)], 1);
        assert_eq!(to_params(seq), Err(ErrorCode::InvalidParameterList));
    }

    #[test]
    fn test_literal_param_rejected() {
        let seq = sequence(vec![ident_expr("a", 0), number(1.0)], 1);
        assert_eq!(to_params(seq), Err(ErrorCode::InvalidParameterList));
    }

    #[test]
    fn test_object_pattern_alias_and_nesting() {
        let obj = ObjectLit {
            span: sp(),
            properties: vec![
                Property::Pair {
                    key: ident_expr("a", 0),
                    value: ident_expr("b", 0),
                    computed: false,
                },
                Property::Pair {
                    key: ident_expr("c", 0),
                    value: array(vec![ident_expr("d", 0)], 0),
                    computed: false,
                },
            ],
            parens: 0,
        };
        let pattern = to_object_pattern(obj).unwrap();
        assert_eq!(pattern.properties[0].alias(), Some("b"));
        assert!(matches!(pattern.properties[1].value, Pattern::Array(_)));
    }

    #[test]
    fn test_object_pattern_rejects_computed_and_spread() {
        let computed = ObjectLit {
            span: sp(),
            properties: vec![Property::Pair {
                key: ident_expr("a", 0),
                value: ident_expr("a", 0),
                computed: true,
            }],
            parens: 0,
        };
        assert_eq!(
            to_object_pattern(computed),
            Err(ErrorCode::InvalidDestructure)
        );

        let spread = ObjectLit {
            span: sp(),
            properties: vec![Property::Spread(ident_expr("rest", 0))],
            parens: 0,
        };
        assert_eq!(to_object_pattern(spread), Err(ErrorCode::InvalidDestructure));
    }

    #[test]
    fn test_array_pattern_holes() {
        let arr = ArrayLit {
            span: sp(),
            elements: vec![
                ident_expr("a", 0),
                Expr::NoArg(NoArg { span: sp(), parens: 0 }),
                ident_expr("b", 0),
            ],
            parens: 0,
        };
        let pattern = to_array_pattern(arr).unwrap();
        assert_eq!(pattern.elements.len(), 3);
        assert!(pattern.elements[1].is_none());
    }

    #[test]
    fn test_array_pattern_rejects_literals() {
        let arr = ArrayLit {
            span: sp(),
            elements: vec![number(1.0)],
            parens: 0,
        };
        assert_eq!(to_array_pattern(arr), Err(ErrorCode::InvalidDestructure));
    }

    #[test]
    fn test_assign_targets() {
        assert!(to_assign_target(ident_expr("x", 0), "+=").is_ok());
        assert!(matches!(
            to_assign_target(array(vec![ident_expr("a", 0)], 0), "="),
            Ok(Expr::ArrayPattern(_))
        ));
        assert_eq!(
            to_assign_target(array(vec![ident_expr("a", 0)], 0), "+="),
            Err(ErrorCode::InvalidAssignmentTarget)
        );
        assert_eq!(
            to_assign_target(number(1.0), "="),
            Err(ErrorCode::InvalidAssignmentTarget)
        );
    }
}
