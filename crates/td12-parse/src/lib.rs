//! td12-parse - turns a token stream into a syntax tree.
//!
//! The grammar is recursive-descent at the statement and item level.
//! Expressions are split by locating the single loosest-binding operator
//! at the current nesting level and recursing on each side, rather than by
//! a Pratt-style binding-power loop.

pub mod ast;
pub mod parser;

pub use ast::*;

use td12_lex::Token;
use td12_util::Diagnostic;

/// Parses a complete token stream into a [`File`].
pub fn parse(tokens: Vec<Token>) -> Result<File, Diagnostic> {
    parser::file_sa(tokens)
}
