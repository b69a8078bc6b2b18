//! Command-line surface for the compiler driver.

use std::path::PathBuf;

use clap::Parser;

/// td12c - compiles td12dk source into td12dk assembly.
#[derive(Parser, Debug)]
#[command(name = "td12c")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles td12dk source into td12dk assembly", long_about = None)]
pub struct Cli {
    /// Source file to compile
    pub input: PathBuf,

    /// Name of the function to jump to on reset
    #[arg(long, default_value = "main")]
    pub entry: String,

    /// Write the token stream dump here
    #[arg(long)]
    pub emit_tokens: Option<PathBuf>,

    /// Write the syntax tree dump here
    #[arg(long)]
    pub emit_tree: Option<PathBuf>,

    /// Write the semantically-annotated tree dump here
    #[arg(long)]
    pub emit_annotated_tree: Option<PathBuf>,

    /// Write the generated assembly here (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose stage-by-stage logging
    #[arg(short, long)]
    pub verbose: bool,
}
