//! Error types for the assembler/linker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsmError {
    #[error("line {line}: invalid instruction '{text}'")]
    InvalidInstruction { line: usize, text: String },

    #[error("line {line}: invalid register '{text}'")]
    InvalidRegister { line: usize, text: String },

    #[error("line {line}: wrong number of operands for {mnemonic} (expected {expected}, got {got})")]
    WrongOperandCount { line: usize, mnemonic: String, expected: usize, got: usize },

    #[error("line {line}: invalid immediate '{text}'")]
    InvalidImmediate { line: usize, text: String },

    #[error("line {line}: invalid memory-location directive '{text}'")]
    InvalidDirective { line: usize, text: String },

    #[error("label '{name}' already declared (first seen on line {first_line}, redeclared on line {line})")]
    DuplicateLabel { name: String, first_line: usize, line: usize },

    #[error("undefined label '{name}' referenced on line {line}")]
    UndefinedLabel { name: String, line: usize },

    #[error("program does not fit in ROM: {used} words > {capacity} words")]
    ProgramTooLarge { used: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, AsmError>;
