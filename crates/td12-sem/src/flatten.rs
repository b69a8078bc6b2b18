//! Expression flattening: turns a general expression tree into a sequence
//! of three-address-style operations, introducing synthesized
//! `` `N `` temporaries for any sub-expression that isn't already a base
//! value. Mirrors the source language's `_flatten_statement` pass:
//! increment/decrement and `@`/`$` operate directly on an lvalue shape,
//! `.` builds a compound identifier, `=` embeds the RHS's own final node
//! rather than re-lifting it, and every other operator lifts each non-atom
//! operand into its own internal definition before referencing it by name.

use std::cell::Cell;

use td12_parse::{BinaryOp, Expr, UnaryOp};
use td12_util::{Diagnostic, ErrorCategory, Span, Symbol};

/// A fully flattened operand or operation. Unlike the parser's `Expr`,
/// `.`/`@`/`$` are represented as their own node kinds rather than as
/// generic binary/unary expressions, since by this stage they have already
/// been verified to apply to an lvalue.
#[derive(Clone, Debug)]
pub enum FlatNode {
    BuiltInConst(td12_parse::BuiltInConst, Span),
    NumberLiteral(String, Span),
    CharLiteral(String, Span),
    StringLiteral(String, Span),
    Identifier(Symbol, Span),
    CompoundIdentifier(Box<FlatNode>, Box<FlatNode>, Span),
    AddressOfIdentifier(Box<FlatNode>, Span),
    DereferenceIdentifier(Box<FlatNode>, Span),
    Call { callee: Symbol, args: Vec<td12_parse::FunctionArgument>, span: Span },
    Unary { op: UnaryOp, operand: Box<FlatNode>, span: Span },
    Binary { op: BinaryOp, lhs: Box<FlatNode>, rhs: Box<FlatNode>, span: Span },
    Ternary { condition: Box<FlatNode>, if_true: Box<FlatNode>, if_false: Box<FlatNode>, span: Span },
    NoOp(Span),
}

impl FlatNode {
    pub fn span(&self) -> &Span {
        match self {
            FlatNode::BuiltInConst(_, s)
            | FlatNode::NumberLiteral(_, s)
            | FlatNode::CharLiteral(_, s)
            | FlatNode::StringLiteral(_, s)
            | FlatNode::Identifier(_, s)
            | FlatNode::CompoundIdentifier(_, _, s)
            | FlatNode::AddressOfIdentifier(_, s)
            | FlatNode::DereferenceIdentifier(_, s)
            | FlatNode::Call { span: s, .. }
            | FlatNode::Unary { span: s, .. }
            | FlatNode::Binary { span: s, .. }
            | FlatNode::Ternary { span: s, .. }
            | FlatNode::NoOp(s) => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InternalDefinition {
    pub name: Symbol,
    pub value: FlatNode,
    pub span: Span,
}

/// The result of flattening one expression: zero or more internal
/// definitions (in the order they must be emitted) plus the final
/// operation or value the caller should reference.
#[derive(Clone, Debug)]
pub struct Flattened {
    pub internal_defs: Vec<InternalDefinition>,
    pub result: FlatNode,
}

thread_local! {
    static NEXT_TEMP: Cell<u64> = const { Cell::new(0) };
}

/// Generates the next globally monotonic synthesized name, `` `0 ``, `` `1 ``, ...
pub fn next_temp_name() -> Symbol {
    NEXT_TEMP.with(|n| {
        let id = n.get();
        n.set(id + 1);
        Symbol::intern(&format!("`{id}"))
    })
}

fn invalid_operand(operator_span: Span, operand_span: Span) -> Diagnostic {
    Diagnostic::new(
        ErrorCategory::Semantic,
        "InvalidOperand",
        "this operand is not an lvalue",
        operand_span,
    )
    .with_context(operator_span)
}

/// True for the forms the flattener treats as already-atomic: literals,
/// built-in constants, plain identifiers, and calls (whose own arguments
/// are not recursively flattened).
fn is_base_value(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::BuiltInConst { .. }
            | Expr::NumberLiteral { .. }
            | Expr::CharLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::Identifier { .. }
            | Expr::Call { .. }
    )
}

fn atom_to_flatnode(expr: &Expr) -> FlatNode {
    match expr {
        Expr::BuiltInConst { value, span } => FlatNode::BuiltInConst(*value, span.clone()),
        Expr::NumberLiteral { text, span } => FlatNode::NumberLiteral(text.clone(), span.clone()),
        Expr::CharLiteral { text, span } => FlatNode::CharLiteral(text.clone(), span.clone()),
        Expr::StringLiteral { text, span } => FlatNode::StringLiteral(text.clone(), span.clone()),
        Expr::Identifier { name, span } => FlatNode::Identifier(*name, span.clone()),
        Expr::Call { callee, args, span, .. } => FlatNode::Call {
            callee: *callee,
            args: args.clone(),
            span: span.clone(),
        },
        Expr::NoOp { span } => FlatNode::NoOp(span.clone()),
        other => unreachable!("atom_to_flatnode called on non-atom {other:?}"),
    }
}

/// Converts an lvalue-shaped expression (identifier, `.`, `@`, `$`) into its
/// [`FlatNode`] form, without flattening: these forms denote storage
/// locations directly and never need a synthesized temporary.
pub fn lvalue_to_flatnode(expr: &Expr, operator_span: &Span) -> Result<FlatNode, Diagnostic> {
    match expr {
        Expr::Identifier { name, span } => Ok(FlatNode::Identifier(*name, span.clone())),
        Expr::Binary { op: BinaryOp::MemberOf, lhs, rhs, span } => Ok(FlatNode::CompoundIdentifier(
            Box::new(lvalue_to_flatnode(lhs, operator_span)?),
            Box::new(lvalue_to_flatnode(rhs, operator_span)?),
            span.clone(),
        )),
        Expr::Unary { op: UnaryOp::AddressOf, operand, span } => Ok(FlatNode::AddressOfIdentifier(
            Box::new(lvalue_to_flatnode(operand, operator_span)?),
            span.clone(),
        )),
        Expr::Unary { op: UnaryOp::Dereference, operand, span } => Ok(FlatNode::DereferenceIdentifier(
            Box::new(lvalue_to_flatnode(operand, operator_span)?),
            span.clone(),
        )),
        other => Err(invalid_operand(operator_span.clone(), other.span().clone())),
    }
}

/// Flattens `operand`, lifting its result into a fresh internal definition
/// unless it is already atomic. Returns the defs to splice in (including
/// the new one, if any) and the [`FlatNode`] the caller should reference.
fn lift(operand: &Expr) -> Result<(Vec<InternalDefinition>, FlatNode), Diagnostic> {
    if is_base_value(operand) {
        return Ok((Vec::new(), atom_to_flatnode(operand)));
    }
    let flattened = flatten(operand)?;
    let name = next_temp_name();
    let span = operand.span().clone();
    let mut defs = flattened.internal_defs;
    defs.push(InternalDefinition { name, value: flattened.result, span });
    Ok((defs, FlatNode::Identifier(name, operand.span().clone())))
}

/// Flattens `expr` into an ordered sequence of internal definitions plus a
/// final result node, per the rules in the module doc comment.
pub fn flatten(expr: &Expr) -> Result<Flattened, Diagnostic> {
    match expr {
        Expr::Unary { op, operand, span } => {
            if matches!(
                op,
                UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement
            ) {
                let lv = lvalue_to_flatnode(operand, span)?;
                return Ok(Flattened {
                    internal_defs: Vec::new(),
                    result: FlatNode::Unary { op: *op, operand: Box::new(lv), span: span.clone() },
                });
            }
            if matches!(op, UnaryOp::AddressOf | UnaryOp::Dereference) {
                return Ok(Flattened { internal_defs: Vec::new(), result: lvalue_to_flatnode(expr, span)? });
            }
            if is_base_value(operand) {
                return Ok(Flattened {
                    internal_defs: Vec::new(),
                    result: FlatNode::Unary {
                        op: *op,
                        operand: Box::new(atom_to_flatnode(operand)),
                        span: span.clone(),
                    },
                });
            }
            let (defs, node) = lift(operand)?;
            Ok(Flattened {
                internal_defs: defs,
                result: FlatNode::Unary { op: *op, operand: Box::new(node), span: span.clone() },
            })
        }

        Expr::Binary { op: BinaryOp::MemberOf, lhs, rhs, span } => Ok(Flattened {
            internal_defs: Vec::new(),
            result: FlatNode::CompoundIdentifier(
                Box::new(lvalue_to_flatnode(lhs, span)?),
                Box::new(lvalue_to_flatnode(rhs, span)?),
                span.clone(),
            ),
        }),

        Expr::Binary { op: BinaryOp::Assignment, lhs, rhs, span } => {
            let flattened_rhs = flatten(rhs)?;
            let lhs_node = lvalue_to_flatnode(lhs, span)?;
            Ok(Flattened {
                internal_defs: flattened_rhs.internal_defs,
                result: FlatNode::Binary {
                    op: BinaryOp::Assignment,
                    lhs: Box::new(lhs_node),
                    rhs: Box::new(flattened_rhs.result),
                    span: span.clone(),
                },
            })
        }

        Expr::Binary { op, lhs, rhs, span } if op.is_assignment() => {
            let lhs_node = lvalue_to_flatnode(lhs, span)?;
            if is_base_value(rhs) {
                return Ok(Flattened {
                    internal_defs: Vec::new(),
                    result: FlatNode::Binary {
                        op: *op,
                        lhs: Box::new(lhs_node),
                        rhs: Box::new(atom_to_flatnode(rhs)),
                        span: span.clone(),
                    },
                });
            }
            let (defs, node) = lift(rhs)?;
            Ok(Flattened {
                internal_defs: defs,
                result: FlatNode::Binary { op: *op, lhs: Box::new(lhs_node), rhs: Box::new(node), span: span.clone() },
            })
        }

        Expr::Binary { op, lhs, rhs, span } => {
            let (mut defs1, node1) = lift(lhs)?;
            let (defs2, node2) = lift(rhs)?;
            defs1.extend(defs2);
            Ok(Flattened {
                internal_defs: defs1,
                result: FlatNode::Binary { op: *op, lhs: Box::new(node1), rhs: Box::new(node2), span: span.clone() },
            })
        }

        Expr::Ternary { condition, if_true, if_false, span } => {
            let (mut defs1, node1) = lift(condition)?;
            let (defs2, node2) = lift(if_true)?;
            let (defs3, node3) = lift(if_false)?;
            defs1.extend(defs2);
            defs1.extend(defs3);
            Ok(Flattened {
                internal_defs: defs1,
                result: FlatNode::Ternary {
                    condition: Box::new(node1),
                    if_true: Box::new(node2),
                    if_false: Box::new(node3),
                    span: span.clone(),
                },
            })
        }

        other => Ok(Flattened { internal_defs: Vec::new(), result: atom_to_flatnode(other) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td12_lex::tokenize;
    use td12_parse::{parse, Item, Stmt};

    fn flatten_stmt_expr(src: &str) -> Flattened {
        let tokens = tokenize(src, "t.td12").unwrap();
        let file = parse(tokens).unwrap();
        let Item::Function(f) = &file.items[0] else { panic!() };
        let Stmt::Expr(e) = &f.code[0] else { panic!() };
        flatten(e).unwrap()
    }

    #[test]
    fn flattening_preserves_operand_count() {
        let flattened = flatten_stmt_expr("fn f() -> int { a = b + c * d; }");
        assert_eq!(flattened.internal_defs.len(), 1);
        assert!(matches!(flattened.result, FlatNode::Binary { op: BinaryOp::Assignment, .. }));
    }

    #[test]
    fn atomic_assignment_needs_no_internal_defs() {
        let flattened = flatten_stmt_expr("fn f() -> int { a = b; }");
        assert_eq!(flattened.internal_defs.len(), 0);
    }

    #[test]
    fn member_of_builds_compound_identifier_without_lifting() {
        let flattened = flatten_stmt_expr("fn f() -> int { a.b; }");
        assert_eq!(flattened.internal_defs.len(), 0);
        assert!(matches!(flattened.result, FlatNode::CompoundIdentifier(..)));
    }
}
