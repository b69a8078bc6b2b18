//! td12asm - assembler driver.
//!
//! Prints every error found during assembly as it surfaces, then fails
//! with the last one; per the core crate's propagation policy, no output
//! file is written unless assembly succeeded outright.

pub mod cli;

use std::fs;

pub use cli::Cli;

/// Assembles `cli.input` and writes whichever outputs were requested.
/// Returns the final error's message on failure, after every error has
/// already been printed to stderr.
pub fn run(cli: &Cli) -> Result<(), String> {
    let source = fs::read_to_string(&cli.input)
        .map_err(|e| format!("error: could not read {}: {e}", cli.input.display()))?;

    let program = match td12_asm::assemble(&source) {
        Ok(program) => program,
        Err(errors) => {
            for error in &errors {
                eprintln!("error: {error}");
            }
            return Err(errors.last().map(|e| e.to_string()).unwrap_or_default());
        }
    };

    if let Some(path) = &cli.output {
        fs::write(path, program.to_bytes())
            .map_err(|e| format!("error: could not write {}: {e}", path.display()))?;
    }
    if let Some(path) = &cli.labels {
        fs::write(path, program.labels_listing())
            .map_err(|e| format!("error: could not write {}: {e}", path.display()))?;
    }
    if let Some(path) = &cli.hex {
        fs::write(path, program.hex_str())
            .map_err(|e| format!("error: could not write {}: {e}", path.display()))?;
    }

    Ok(())
}
