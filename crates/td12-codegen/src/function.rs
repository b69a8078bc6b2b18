//! Per-function code generation: frame layout, the prologue/epilogue pair,
//! and block/while lowering.

use td12_parse::BuiltInConst;
use td12_sem::{SemFunction, SemStmt};
use td12_util::{Diagnostic, ErrorCategory, Symbol};

use crate::exprs::gen_expr;
use crate::state::State;

fn not_implemented(what: &str, span: &td12_util::Span) -> Diagnostic {
    Diagnostic::new(
        ErrorCategory::CodeGeneration,
        "CodeGenerationNotImplemented",
        format!("code generation not implemented for {what}"),
        span.clone(),
    )
}

/// Walks a function's statement list (params, statics, then locals and
/// internal definitions in source order) to assign each a distinct frame
/// slot, mirroring the local symbol table the analyzer builds.
fn collect_frame_slots(func: &SemFunction) -> Vec<Symbol> {
    let mut names = Vec::new();
    if func.return_type.is_some() {
        names.push(func.identifier);
    }
    for param in &func.params {
        names.push(param.identifier);
    }
    for member in &func.members {
        names.push(member.identifier);
    }
    collect_from_block(&func.code, &mut names);
    names
}

fn collect_from_block(stmts: &[SemStmt], names: &mut Vec<Symbol>) {
    for stmt in stmts {
        match stmt {
            SemStmt::Let(let_stmt) => names.push(let_stmt.identifier),
            SemStmt::InternalDefinition(def) => names.push(def.name),
            SemStmt::Expr(_) | SemStmt::Loop(..) => {}
            SemStmt::If(b) => {
                collect_from_block(&b.condition, names);
                collect_from_block(&b.code, names);
                if let Some(e) = &b.else_block {
                    collect_from_block(&e.code, names);
                }
            }
            SemStmt::While(b) => {
                collect_from_block(&b.condition, names);
                collect_from_block(&b.code, names);
                if let Some(e) = &b.else_block {
                    collect_from_block(&e.code, names);
                }
            }
            SemStmt::Do(b) => {
                collect_from_block(&b.first_code, names);
                collect_from_block(&b.condition, names);
                if let Some(c) = &b.second_code {
                    collect_from_block(c, names);
                }
                if let Some(e) = &b.else_block {
                    collect_from_block(&e.code, names);
                }
            }
            SemStmt::For(b) => {
                match &b.pre_statement {
                    td12_sem::SemForPreStatement::Expr(s) => collect_from_block(s, names),
                    td12_sem::SemForPreStatement::Decl { identifier, assignment, .. } => {
                        if let Some(a) = assignment {
                            collect_from_block(a, names);
                        }
                        names.push(*identifier);
                    }
                }
                collect_from_block(&b.condition, names);
                collect_from_block(&b.code, names);
                collect_from_block(&b.post_statement, names);
                if let Some(e) = &b.else_block {
                    collect_from_block(&e.code, names);
                }
            }
        }
    }
}

/// Recursively gathers every `let` statement in source order, including
/// ones nested in if/while/do/for bodies: the generator initializes every
/// local's value up front, before control flow reaches its declaration.
fn collect_lets<'a>(stmts: &'a [SemStmt], out: &mut Vec<&'a td12_parse::LetStatement>) {
    for stmt in stmts {
        match stmt {
            SemStmt::Let(let_stmt) => out.push(let_stmt),
            SemStmt::If(b) => {
                collect_lets(&b.code, out);
                if let Some(e) = &b.else_block {
                    collect_lets(&e.code, out);
                }
            }
            SemStmt::While(b) => {
                collect_lets(&b.code, out);
                if let Some(e) = &b.else_block {
                    collect_lets(&e.code, out);
                }
            }
            SemStmt::Do(b) => {
                collect_lets(&b.first_code, out);
                if let Some(c) = &b.second_code {
                    collect_lets(c, out);
                }
                if let Some(e) = &b.else_block {
                    collect_lets(&e.code, out);
                }
            }
            SemStmt::For(b) => {
                collect_lets(&b.code, out);
                if let Some(e) = &b.else_block {
                    collect_lets(&e.code, out);
                }
            }
            SemStmt::InternalDefinition(_) | SemStmt::Expr(_) | SemStmt::Loop(..) => {}
        }
    }
}

/// True when `condition` is exactly the one-statement block `[true]`, the
/// only while-loop condition code generation currently supports.
fn is_const_true_condition(condition: &[SemStmt]) -> bool {
    matches!(
        condition,
        [SemStmt::Expr(td12_sem::FlatNode::BuiltInConst(BuiltInConst::True, _))]
    )
}

fn gen_while(state: &mut State, block: &td12_sem::SemWhileBlock, out: &mut String) -> Result<(), Diagnostic> {
    if !is_const_true_condition(&block.condition) {
        return Err(not_implemented("while loop non-true conditions", &block.span));
    }
    let start = state.loop_label();
    let end = state.loop_label();
    let brk = state.loop_label();
    out.push_str(&format!("{start}:\n"));
    gen_block(state, &block.code, out)?;
    out.push_str(&format!("ldi :{start}\nor PC MP ZR\n{end}:\n"));
    if let Some(else_block) = &block.else_block {
        gen_block(state, &else_block.code, out)?;
    }
    out.push_str(&format!("{brk}:\n"));
    Ok(())
}

fn gen_block(state: &mut State, stmts: &[SemStmt], out: &mut String) -> Result<(), Diagnostic> {
    for stmt in stmts {
        match stmt {
            SemStmt::Let(_) => {}
            SemStmt::Expr(node) => gen_expr(state, node, out)?,
            SemStmt::While(w) => gen_while(state, w, out)?,
            other => {
                let span = match other {
                    SemStmt::InternalDefinition(d) => &d.span,
                    SemStmt::Loop(_, s) => s,
                    SemStmt::If(b) => &b.span,
                    SemStmt::Do(b) => &b.span,
                    SemStmt::For(b) => &b.span,
                    SemStmt::Let(_) | SemStmt::Expr(_) | SemStmt::While(_) => unreachable!(),
                };
                return Err(not_implemented(&format!("{other:?}"), span));
            }
        }
    }
    Ok(())
}

/// Generates one function's label, prologue, body, and epilogue.
pub fn gen_function(state: &mut State, func: &SemFunction) -> Result<String, Diagnostic> {
    let frame = collect_frame_slots(func);
    let frame_size = frame.len() as u32;
    let local: std::collections::HashMap<Symbol, u32> =
        frame.iter().enumerate().map(|(i, s)| (*s, i as u32)).collect();
    state.enter_function(local);

    let mut out = String::new();
    out.push_str(&format!("{}:\n", func.identifier.as_str()));
    out.push_str(&format!("\n; Initializing stack for function: {}\n", func.identifier.as_str()));
    out.push_str(&crate::state::load_immediate(frame_size));
    out.push_str("sub SP SP MP\n\n");

    let mut lets = Vec::new();
    collect_lets(&func.code, &mut lets);
    for let_stmt in func.members.iter().chain(lets.iter().copied()) {
        gen_local_init(state, let_stmt, &mut out)?;
    }

    gen_block(state, &func.code, &mut out)?;

    out.push_str(&format!("\n; Uninitializing stack for function: {}\n", func.identifier.as_str()));
    out.push_str(&crate::state::load_immediate(frame_size));
    out.push_str("add SP SP MP\n");
    Ok(out)
}

fn gen_local_init(state: &mut State, let_stmt: &td12_parse::LetStatement, out: &mut String) -> Result<(), Diagnostic> {
    let Some(assignment) = &let_stmt.assignment else { return Ok(()) };
    let value = match assignment {
        td12_parse::Expr::NumberLiteral { text, .. } => crate::exprs::literal_value(text),
        td12_parse::Expr::BuiltInConst { value, .. } => value.value() as i64,
        td12_parse::Expr::StringLiteral { span, .. } => {
            return Err(not_implemented("loading string literals", span));
        }
        other => return Err(not_implemented("this local initializer form", other.span())),
    };
    out.push_str(&format!("; Loading initial value for {}\n", let_stmt.identifier.as_str()));
    out.push_str(&crate::state::load_immediate(value as u32 & 0xfff));
    out.push_str("or D0 MP ZR\n");
    out.push_str(&crate::state::load_immediate(state.frame_offset(let_stmt.identifier)));
    out.push_str("add MP SP MP\n");
    out.push_str("str D0\n");
    Ok(())
}
