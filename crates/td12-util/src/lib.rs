//! td12-util - foundation types shared by every stage of the td12dk toolchain.
//!
//! This crate has no knowledge of the source language, the assembly
//! language, or the target machine. It only provides:
//!
//! - [`span`]: source position tracking with union semantics
//! - [`diagnostic`]: typed error categories and human-readable rendering
//! - [`symbol`]: interned identifiers

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, ErrorCategory};
pub use span::Span;
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
