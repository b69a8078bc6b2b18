//! td12-sem - semantic analysis for the td12dk compiler.
//!
//! Resolves every identifier against a lexically scoped symbol table,
//! flattens expressions into three-address form via synthesized
//! temporaries, and normalizes enum member values.

pub mod analysis;
pub mod flatten;
pub mod ir;
pub mod symbol;

pub use analysis::analyze;
pub use ir::*;
