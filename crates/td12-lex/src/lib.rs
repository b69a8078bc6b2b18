//! td12-lex - the lexical analysis stage of the td12dk compiler.
//!
//! Turns source text into a flat token stream: directives, identifiers,
//! keywords, number/char/string literals, and punctuation. Comments are
//! discarded here and never reach the parser.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use td12_util::Diagnostic;

/// Tokenize `source`, attributing every span to `filename`.
pub fn tokenize(source: &str, filename: impl Into<String>) -> Result<Vec<Token>, Diagnostic> {
    Lexer::tokenize(source, filename)
}
