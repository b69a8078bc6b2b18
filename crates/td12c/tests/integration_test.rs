use std::fs;

use td12c::{cli::Cli, run};

fn cli_for(input: &std::path::Path, output: &std::path::Path) -> Cli {
    Cli {
        input: input.to_path_buf(),
        entry: "main".to_string(),
        emit_tokens: None,
        emit_tree: None,
        emit_annotated_tree: None,
        output: Some(output.to_path_buf()),
        verbose: false,
    }
}

#[test]
fn compiles_a_trivial_program_to_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("main.td12");
    let output = dir.path().join("main.asm");
    fs::write(&input, "fn main() -> int { let a: int = 1; let b: int = 2; a = a + b; }").unwrap();

    run(&cli_for(&input, &output)).unwrap();

    let asm = fs::read_to_string(&output).unwrap();
    assert!(asm.contains("main:"));
    assert!(asm.contains("add "));
}

#[test]
fn unsupported_construct_reports_a_rendered_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("main.td12");
    let output = dir.path().join("main.asm");
    fs::write(&input, "fn main() -> int { let a: int = 1; let b: int = 2; a = a - b; }").unwrap();

    let err = run(&cli_for(&input, &output)).unwrap_err();
    assert!(err.contains("Code Generation"));
}
