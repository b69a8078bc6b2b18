//! Expression emission. Per the design, only addition and assignment are
//! implemented; every other operator raises `CodeGenerationNotImplemented`
//! pointing at the operator's span.

use td12_parse::BuiltInConst;
use td12_sem::FlatNode;
use td12_util::{Diagnostic, ErrorCategory, Span};

use crate::state::{Register, State};

fn not_implemented(what: &str, span: &Span) -> Diagnostic {
    Diagnostic::new(
        ErrorCategory::CodeGeneration,
        "CodeGenerationNotImplemented",
        format!("code generation not implemented for {what}"),
        span.clone(),
    )
}

/// Parses a number-literal's lexeme the same way the parser does when
/// folding enum member values, reused here for local initializers.
pub fn literal_value(text: &str) -> i64 {
    parse_number_literal(text)
}

fn parse_number_literal(text: &str) -> i64 {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(rest) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
        i64::from_str_radix(rest, 2).unwrap_or(0)
    } else if let Some(rest) = cleaned.strip_prefix("0o").or(cleaned.strip_prefix("0O")) {
        i64::from_str_radix(rest, 8).unwrap_or(0)
    } else if let Some(rest) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X")) {
        i64::from_str_radix(rest, 16).unwrap_or(0)
    } else {
        cleaned.parse::<f64>().map(|f| f as i64).unwrap_or(0)
    }
}

fn parse_char_literal(text: &str) -> i64 {
    let inner = text.trim_matches('\'');
    let mut chars = inner.chars();
    match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => b'\n' as i64,
            Some('t') => b'\t' as i64,
            Some('r') => b'\r' as i64,
            Some('0') => 0,
            Some('\\') => b'\\' as i64,
            Some('\'') => b'\'' as i64,
            Some(other) => other as i64,
            None => 0,
        },
        Some(c) => c as i64,
        None => 0,
    }
}

/// True for a node that is directly emittable as an immediate value,
/// rather than requiring a symbol lookup.
fn immediate_value(node: &FlatNode) -> Option<i64> {
    match node {
        FlatNode::BuiltInConst(c, _) => Some(c.value() as i64),
        FlatNode::NumberLiteral(text, _) => Some(parse_number_literal(text)),
        FlatNode::CharLiteral(text, _) => Some(parse_char_literal(text)),
        _ => None,
    }
}

/// Loads a base-value operand (identifier or immediate) into a register,
/// returning that register.
fn load_operand(state: &mut State, node: &FlatNode, out: &mut String) -> Result<Register, Diagnostic> {
    match node {
        FlatNode::Identifier(name, span) => state.get_symbol(*name, span, out),
        other => match immediate_value(other) {
            Some(v) => Ok(state.load_immediate_into_rotation(v as u32 & 0xfff, out)),
            None => Err(not_implemented("this operand form", other.span())),
        },
    }
}

/// Emits code for one flattened statement-level expression (an
/// [`FlatNode::Binary`] with `Addition` or `Assignment`, per the supported
/// operator set). Anything else raises `CodeGenerationNotImplemented`.
pub fn gen_expr(state: &mut State, node: &FlatNode, out: &mut String) -> Result<(), Diagnostic> {
    match node {
        // An addition with no destination to write into is a no-op as a
        // bare statement; it only does work when it is an assignment's
        // right-hand side, handled below.
        FlatNode::Binary { op: td12_parse::BinaryOp::Addition, .. } => Ok(()),
        FlatNode::Binary { op: td12_parse::BinaryOp::Assignment, lhs, rhs, span } => gen_assignment(state, lhs, rhs, span, out),
        other => Err(not_implemented(&format!("{other:?}"), other.span())),
    }
}

/// Emits `add dst, a, b` for `lhs + rhs`, where `dst` is `into` if given,
/// otherwise a freshly rotated register.
fn gen_addition_into(
    state: &mut State,
    lhs: &FlatNode,
    rhs: &FlatNode,
    span: &Span,
    out: &mut String,
    into: Option<Register>,
) -> Result<Register, Diagnostic> {
    let rega = load_operand(state, lhs, out)?;
    let regb = load_operand(state, rhs, out)?;
    let dst = into.unwrap_or(rega);
    out.push_str(&format!("add {} {} {}\n", dst.name(), rega.name(), regb.name()));
    Ok(dst)
}

/// Emits an assignment: the right side is evaluated into the register
/// currently bound to the left side's lvalue (loading it there if it
/// isn't already resident).
fn gen_assignment(state: &mut State, lhs: &FlatNode, rhs: &FlatNode, span: &Span, out: &mut String) -> Result<(), Diagnostic> {
    let FlatNode::Identifier(lhs_name, lhs_span) = lhs else {
        return Err(not_implemented("assignment to a non-identifier lvalue", span));
    };
    let dst = state.get_symbol(*lhs_name, lhs_span, out)?;
    match rhs {
        FlatNode::Binary { op: td12_parse::BinaryOp::Addition, lhs: a, rhs: b, span: add_span } => {
            gen_addition_into(state, a, b, add_span, out, Some(dst))?;
        }
        FlatNode::Identifier(name, span) => {
            let src = state.get_symbol(*name, span, out)?;
            out.push_str(&format!("or {} {} ZR\n", dst.name(), src.name()));
        }
        other => match immediate_value(other) {
            Some(v) => {
                out.push_str(&crate::state::load_immediate(v as u32 & 0xfff));
                out.push_str(&format!("or {} MP ZR\n", dst.name()));
            }
            None => return Err(not_implemented("this assignment right-hand side", other.span())),
        },
    }
    Ok(())
}
