//! td12c - compiler driver.
//!
//! Orchestrates the synchronous lex → parse → analyze → codegen pipeline,
//! writing each stage's dump if the caller asked for one and the stage
//! reached completion. Every stage either returns a well-formed successor
//! or a single [`td12_util::Diagnostic`]; there is no partial recovery.

pub mod cli;

use std::fs;
use std::path::Path;

use td12_util::Diagnostic;

pub use cli::Cli;

/// Runs the full pipeline for `cli`, writing any requested dumps along the
/// way. Returns the rendered diagnostic (ready to print) on failure.
pub fn run(cli: &Cli) -> Result<(), String> {
    let filename = cli.input.display().to_string();
    let source = fs::read_to_string(&cli.input)
        .map_err(|e| format!("error: could not read {filename}: {e}"))?;

    let render = |diag: &Diagnostic| diag.render(&source);

    if cli.verbose {
        tracing::info!("lexing {filename}");
    }
    let tokens = td12_lex::tokenize(&source, filename.clone()).map_err(|e| render(&e))?;
    if let Some(path) = &cli.emit_tokens {
        write_dump(path, &format!("{tokens:#?}\n"))?;
    }

    if cli.verbose {
        tracing::info!("parsing {filename}");
    }
    let file = td12_parse::parse(tokens).map_err(|e| render(&e))?;
    if let Some(path) = &cli.emit_tree {
        write_dump(path, &format!("{file:#?}\n"))?;
    }

    if cli.verbose {
        tracing::info!("analyzing {filename}");
    }
    let sem = td12_sem::analyze(&file).map_err(|e| render(&e))?;
    if let Some(path) = &cli.emit_annotated_tree {
        write_dump(path, &format!("{sem:#?}\n"))?;
    }

    if cli.verbose {
        tracing::info!("generating code for entry point '{}'", cli.entry);
    }
    let asm = td12_codegen::generate(&sem, &cli.entry).map_err(|e| render(&e))?;

    match &cli.output {
        Some(path) => write_dump(path, &asm)?,
        None => print!("{asm}"),
    }

    Ok(())
}

fn write_dump(path: &Path, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("error: could not write {}: {e}", path.display()))
}
