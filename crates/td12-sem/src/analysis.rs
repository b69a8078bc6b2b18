//! Two-pass semantic analysis: top-level symbol registration, then
//! per-function body analysis (flattening + name resolution).

use std::collections::HashSet;

use td12_parse as ast;
use td12_util::{Diagnostic, Span, Symbol};

use crate::flatten::{self, FlatNode};
use crate::ir::*;
use crate::symbol::{SymbolKind, SymbolTable};

/// Pass 1: register every struct/function/enum name in the global table.
fn register_top_level(file: &ast::File, global: &SymbolTable) -> Result<(), Diagnostic> {
    for item in &file.items {
        match item {
            ast::Item::Directive(_, _) => {}
            ast::Item::Struct(s) => global.declare(s.identifier, SymbolKind::Struct, s.identifier_span.clone())?,
            ast::Item::Enum(e) => global.declare(e.identifier, SymbolKind::Enum, e.identifier_span.clone())?,
            ast::Item::Function(f) => global.declare(f.identifier, SymbolKind::Function, f.identifier_span.clone())?,
        }
    }
    Ok(())
}

/// Iterates enum members in source order, assigning each the smallest
/// positive integer not already explicitly used when it has no explicit
/// value, then sorts the result by identifier and then by value.
fn normalize_enum(block: &ast::EnumBlock) -> SemEnum {
    let explicit: HashSet<i32> = block.members.iter().filter_map(|m| m.value).collect();
    let mut next_implicit = 1;
    let mut members = Vec::with_capacity(block.members.len());
    for member in &block.members {
        let value = match member.value {
            Some(v) => {
                next_implicit = v + 1;
                v
            }
            None => {
                while explicit.contains(&next_implicit) {
                    next_implicit += 1;
                }
                let v = next_implicit;
                next_implicit += 1;
                v
            }
        };
        members.push(NormalizedEnumMember { identifier: member.identifier, value, span: member.span.clone() });
    }
    members.sort_by(|a, b| a.identifier.as_str().cmp(b.identifier.as_str()).then(a.value.cmp(&b.value)));
    SemEnum { identifier: block.identifier, members, span: block.span.clone() }
}

fn analyze_function(f: &ast::FunctionBlock, global: &SymbolTable) -> Result<SemFunction, Diagnostic> {
    let table = global.overlay();
    if f.return_type.is_some() {
        table.declare(f.identifier, SymbolKind::ReturnVariable, f.identifier_span.clone())?;
    }
    for param in &f.params {
        table.declare(param.identifier, SymbolKind::Parameter, param.identifier_span.clone())?;
    }
    let mut members = Vec::new();
    let code = analyze_block(&f.code, &table, &mut members)?;
    Ok(SemFunction {
        identifier: f.identifier,
        params: f.params.clone(),
        return_type: f.return_type.clone(),
        return_type_pointer: f.return_type_pointer,
        members,
        code,
        span: f.span.clone(),
    })
}

fn resolve_identifier(table: &SymbolTable, name: Symbol, span: &Span) -> Result<(), Diagnostic> {
    if table.resolve(name).is_some() {
        Ok(())
    } else {
        Err(SymbolTable::undeclared(name, span.clone()))
    }
}

fn resolve_function_name(table: &SymbolTable, name: Symbol, span: &Span) -> Result<(), Diagnostic> {
    if table.resolve_function(name).is_some() {
        Ok(())
    } else {
        Err(SymbolTable::undeclared(name, span.clone()))
    }
}

/// Walks a flattened node's direct operands, checking that every
/// identifier it references resolves in `table`.
fn check_references(node: &FlatNode, table: &SymbolTable) -> Result<(), Diagnostic> {
    match node {
        FlatNode::Identifier(name, span) => resolve_identifier(table, *name, span),
        FlatNode::CompoundIdentifier(owner, _member, _span) => check_references(owner, table),
        FlatNode::AddressOfIdentifier(inner, _) | FlatNode::DereferenceIdentifier(inner, _) => {
            check_references(inner, table)
        }
        FlatNode::Call { callee, args, span } => {
            resolve_function_name(table, *callee, span)?;
            for arg in args {
                check_expr_atom(&arg.value, table)?;
            }
            Ok(())
        }
        FlatNode::Unary { operand, .. } => check_references(operand, table),
        FlatNode::Binary { lhs, rhs, .. } => {
            check_references(lhs, table)?;
            check_references(rhs, table)
        }
        FlatNode::Ternary { condition, if_true, if_false, .. } => {
            check_references(condition, table)?;
            check_references(if_true, table)?;
            check_references(if_false, table)
        }
        FlatNode::BuiltInConst(..)
        | FlatNode::NumberLiteral(..)
        | FlatNode::CharLiteral(..)
        | FlatNode::StringLiteral(..)
        | FlatNode::NoOp(_) => Ok(()),
    }
}

fn check_expr_atom(expr: &ast::Expr, table: &SymbolTable) -> Result<(), Diagnostic> {
    if let ast::Expr::Identifier { name, span } = expr {
        resolve_identifier(table, *name, span)
    } else {
        Ok(())
    }
}

fn flatten_one(expr: &ast::Expr, table: &SymbolTable, out: &mut Vec<SemStmt>) -> Result<(), Diagnostic> {
    let flattened = flatten::flatten(expr)?;
    for def in flattened.internal_defs {
        check_references(&def.value, table)?;
        table.declare(def.name, SymbolKind::Variable, def.span.clone())?;
        out.push(SemStmt::InternalDefinition(def));
    }
    check_references(&flattened.result, table)?;
    out.push(SemStmt::Expr(flattened.result));
    Ok(())
}

/// Flattens and analyzes a single raw expression as a one-statement block
/// (used for loop conditions and post-statements, which are themselves
/// flattened independently of their surrounding loop body).
fn analyze_expr_block(expr: &ast::Expr, table: &SymbolTable) -> Result<Vec<SemStmt>, Diagnostic> {
    let mut out = Vec::new();
    flatten_one(expr, table, &mut out)?;
    Ok(out)
}

fn analyze_else(block: &ast::ElseBlock, table: &SymbolTable, members: &mut Vec<ast::LetStatement>) -> Result<SemElseBlock, Diagnostic> {
    Ok(SemElseBlock { code: analyze_block(&block.code, table, members)?, span: block.span.clone() })
}

fn analyze_block(
    stmts: &[ast::Stmt],
    table: &SymbolTable,
    members: &mut Vec<ast::LetStatement>,
) -> Result<Vec<SemStmt>, Diagnostic> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            ast::Stmt::Let(let_stmt) => {
                table.declare(let_stmt.identifier, SymbolKind::Variable, let_stmt.identifier_span.clone())?;
                if let_stmt.is_static {
                    members.push(let_stmt.clone());
                } else {
                    out.push(SemStmt::Let(let_stmt.clone()));
                }
            }
            ast::Stmt::Loop(kw, span) => out.push(SemStmt::Loop(*kw, span.clone())),
            ast::Stmt::Expr(expr) => flatten_one(expr, table, &mut out)?,
            ast::Stmt::If(b) => {
                let condition = analyze_expr_block(&b.condition, table)?;
                let code = analyze_block(&b.code, table, members)?;
                let else_block = b.else_block.as_ref().map(|e| analyze_else(e, table, members)).transpose()?;
                out.push(SemStmt::If(SemIfBlock { condition, code, else_block, span: b.span.clone() }));
            }
            ast::Stmt::While(b) => {
                let condition = analyze_expr_block(&b.condition, table)?;
                let code = analyze_block(&b.code, table, members)?;
                let else_block = b.else_block.as_ref().map(|e| analyze_else(e, table, members)).transpose()?;
                out.push(SemStmt::While(SemWhileBlock { condition, code, else_block, span: b.span.clone() }));
            }
            ast::Stmt::Do(b) => {
                let first_code = analyze_block(&b.first_code, table, members)?;
                let condition = analyze_expr_block(&b.condition, table)?;
                let second_code = b.second_code.as_ref().map(|c| analyze_block(c, table, members)).transpose()?;
                let else_block = b.else_block.as_ref().map(|e| analyze_else(e, table, members)).transpose()?;
                out.push(SemStmt::Do(SemDoBlock { first_code, condition, second_code, else_block, span: b.span.clone() }));
            }
            ast::Stmt::For(b) => {
                let overlay = table.overlay();
                let pre_statement = match &b.pre_statement {
                    ast::ForPreStatement::Expr(expr) => {
                        SemForPreStatement::Expr(analyze_expr_block(expr, &overlay)?)
                    }
                    ast::ForPreStatement::Decl { identifier, identifier_span, data_type, pointer, assignment, span } => {
                        let assignment = assignment.as_ref().map(|e| analyze_expr_block(e, &overlay)).transpose()?;
                        overlay.declare(*identifier, SymbolKind::Variable, identifier_span.clone())?;
                        SemForPreStatement::Decl {
                            identifier: *identifier,
                            data_type: data_type.clone(),
                            pointer: *pointer,
                            assignment,
                            span: span.clone(),
                        }
                    }
                };
                let condition = analyze_expr_block(&b.condition, &overlay)?;
                let code = analyze_block(&b.code, &overlay, members)?;
                let post_statement = analyze_expr_block(&b.post_statement, &overlay)?;
                let else_block = b.else_block.as_ref().map(|e| analyze_else(e, &overlay, members)).transpose()?;
                out.push(SemStmt::For(SemForBlock { pre_statement, condition, code, post_statement, else_block, span: b.span.clone() }));
            }
        }
    }
    Ok(out)
}

/// Runs both passes over a parsed file, returning the flattened,
/// name-resolved semantic tree.
pub fn analyze(file: &ast::File) -> Result<SemFile, Diagnostic> {
    let global = SymbolTable::new();
    register_top_level(file, &global)?;

    let mut out = SemFile::default();
    for item in &file.items {
        match item {
            ast::Item::Directive(_, _) => {}
            ast::Item::Struct(s) => out.structs.push(SemStruct {
                identifier: s.identifier,
                members: s.members.clone(),
                span: s.span.clone(),
            }),
            ast::Item::Enum(e) => out.enums.push(normalize_enum(e)),
            ast::Item::Function(f) => out.functions.push(analyze_function(f, &global)?),
        }
    }
    Ok(out)
}
