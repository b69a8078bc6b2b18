//! Command-line surface for the assembler/linker driver.

use std::path::PathBuf;

use clap::Parser;

/// td12asm - assembles td12dk assembly into a ROM binary.
#[derive(Parser, Debug)]
#[command(name = "td12asm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assembles td12dk assembly into a ROM binary", long_about = None)]
pub struct Cli {
    /// Assembly source file to assemble
    pub input: PathBuf,

    /// Write the packed ROM binary here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the label listing here
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Write a hex dump of the ROM binary here
    #[arg(long)]
    pub hex: Option<PathBuf>,
}
