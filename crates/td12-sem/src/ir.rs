//! The semantic analyzer's output tree.
//!
//! Structurally similar to the parser's [`td12_parse::File`], but every
//! statement has passed through flattening (so expressions are
//! three-address-style) and every identifier reference has been checked
//! against a symbol table.

use td12_parse::{DataType, FunctionParameter, LetStatement, LoopKeyword, StructureMember};
use td12_util::Span;

use crate::flatten::{FlatNode, InternalDefinition};

#[derive(Clone, Debug)]
pub struct SemElseBlock {
    pub code: Vec<SemStmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SemIfBlock {
    pub condition: Vec<SemStmt>,
    pub code: Vec<SemStmt>,
    pub else_block: Option<SemElseBlock>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SemWhileBlock {
    pub condition: Vec<SemStmt>,
    pub code: Vec<SemStmt>,
    pub else_block: Option<SemElseBlock>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SemDoBlock {
    pub first_code: Vec<SemStmt>,
    pub condition: Vec<SemStmt>,
    pub second_code: Option<Vec<SemStmt>>,
    pub else_block: Option<SemElseBlock>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum SemForPreStatement {
    Expr(Vec<SemStmt>),
    Decl {
        identifier: td12_util::Symbol,
        data_type: DataType,
        pointer: bool,
        assignment: Option<Vec<SemStmt>>,
        span: Span,
    },
}

#[derive(Clone, Debug)]
pub struct SemForBlock {
    pub pre_statement: SemForPreStatement,
    pub condition: Vec<SemStmt>,
    pub code: Vec<SemStmt>,
    pub post_statement: Vec<SemStmt>,
    pub else_block: Option<SemElseBlock>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum SemStmt {
    InternalDefinition(InternalDefinition),
    Expr(FlatNode),
    Let(LetStatement),
    Loop(LoopKeyword, Span),
    If(SemIfBlock),
    While(SemWhileBlock),
    Do(SemDoBlock),
    For(SemForBlock),
}

#[derive(Clone, Debug)]
pub struct SemFunction {
    pub identifier: td12_util::Symbol,
    pub params: Vec<FunctionParameter>,
    pub return_type: Option<DataType>,
    pub return_type_pointer: bool,
    /// Locals declared `static`, hoisted out of `code` per the language's rule.
    pub members: Vec<LetStatement>,
    pub code: Vec<SemStmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SemStruct {
    pub identifier: td12_util::Symbol,
    pub members: Vec<StructureMember>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NormalizedEnumMember {
    pub identifier: td12_util::Symbol,
    pub value: i32,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SemEnum {
    pub identifier: td12_util::Symbol,
    pub members: Vec<NormalizedEnumMember>,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub struct SemFile {
    pub structs: Vec<SemStruct>,
    pub enums: Vec<SemEnum>,
    pub functions: Vec<SemFunction>,
}
