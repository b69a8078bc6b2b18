//! td12-codegen - assembly text generation from the semantic tree.
//!
//! Only a narrow slice of the language lowers to real code: addition,
//! assignment, identifier/immediate loads, and `while(true)` loops.
//! Everything else raises `CodeGenerationNotImplemented` pointing at the
//! offending span, rather than emitting something silently wrong.

mod exprs;
mod function;
mod state;

use std::collections::HashMap;

use td12_sem::SemFile;
use td12_util::{Diagnostic, ErrorCategory, Symbol};

pub use state::{Register, RAM_END, RAM_START};

fn not_implemented(what: &str, span: &td12_util::Span) -> Diagnostic {
    Diagnostic::new(
        ErrorCategory::CodeGeneration,
        "CodeGenerationNotImplemented",
        format!("code generation not implemented for {what}"),
        span.clone(),
    )
}

/// Lays out every function's `static` local at a consecutive RAM address,
/// in function-then-member order, mirroring the original's single global
/// counter starting at the first RAM address.
fn layout_globals(sem: &SemFile) -> Result<HashMap<Symbol, u32>, Diagnostic> {
    let mut memory = state::RAM_START;
    let mut map = HashMap::new();
    for func in &sem.functions {
        for member in &func.members {
            if memory > state::RAM_END {
                return Err(not_implemented("a program whose globals exceed RAM", &member.span));
            }
            map.insert(member.identifier, memory);
            memory += 1;
        }
    }
    Ok(map)
}

/// Generates assembly text for the whole program, jumping to `entry_name`
/// on reset.
pub fn generate(sem: &SemFile, entry_name: &str) -> Result<String, Diagnostic> {
    if let Some(s) = sem.structs.first() {
        return Err(not_implemented("struct declarations", &s.span));
    }
    if let Some(e) = sem.enums.first() {
        return Err(not_implemented("enum declarations", &e.span));
    }

    let globals = layout_globals(sem)?;
    let global_count = globals.len() as u32;
    let mut state = state::State::new();
    state.set_globals(globals);

    let mut out = String::new();
    out.push_str("; Generated by td12c\n");
    out.push_str(&format!(
        "; Global variables use {}/{} bytes\n",
        global_count,
        state::RAM_END - state::RAM_START + 1
    ));
    out.push_str("\n.0x0\n");
    out.push_str(&state::load_immediate(state::RAM_END));
    out.push_str("or SP MP ZR\n");
    out.push_str(&format!("ldi :{entry_name}\nor PC MP ZR\n"));

    for func in &sem.functions {
        out.push('\n');
        out.push_str(&function::gen_function(&mut state, func)?);
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use td12_lex::tokenize;
    use td12_parse::parse;

    fn gen(src: &str) -> Result<String, Diagnostic> {
        let tokens = tokenize(src, "t.td12").unwrap();
        let file = parse(tokens).unwrap();
        let sem = td12_sem::analyze(&file).unwrap();
        generate(&sem, "main")
    }

    #[test]
    fn prologue_jumps_to_entry_point() {
        let code = gen("fn main() -> int { let a: int = 1; a = 1; }").unwrap();
        assert!(code.contains(".0x0"));
        assert!(code.contains("ldi :main"));
        assert!(code.contains("or SP MP ZR"));
    }

    #[test]
    fn assignment_of_two_identifiers_emits_addition() {
        let code = gen(
            "fn main() -> int { let a: int = 0; let b: int = 1; let c: int = 2; a = b + c; }",
        )
        .unwrap();
        assert!(code.contains("add "));
    }

    #[test]
    fn while_true_loop_emits_three_labels() {
        let code = gen("fn main() -> int { let a: int = 0; while (true) { a = 1; } }").unwrap();
        assert!(code.matches("`loop").count() >= 3);
    }

    #[test]
    fn subtraction_is_not_yet_implemented() {
        let err = gen(
            "fn main() -> int { let a: int = 0; let b: int = 1; let c: int = 2; a = b - c; }",
        )
        .unwrap_err();
        assert_eq!(err.kind, "CodeGenerationNotImplemented");
    }

    #[test]
    fn while_false_condition_is_not_yet_implemented() {
        let err = gen("fn main() -> int { let a: int = 0; while (false) { a = 1; } }").unwrap_err();
        assert_eq!(err.kind, "CodeGenerationNotImplemented");
    }
}
