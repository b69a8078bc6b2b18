//! Command-line surface for the emulator driver.

use std::path::PathBuf;

use clap::Parser;

/// td12emu - runs a td12dk ROM image.
#[derive(Parser, Debug)]
#[command(name = "td12emu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs a td12dk ROM image", long_about = None)]
pub struct Cli {
    /// ROM binary to load
    pub rom: PathBuf,

    /// Which device assembly to wire up
    #[arg(long, default_value = "basic")]
    pub machine: String,

    /// Print each decoded instruction before executing it
    #[arg(short, long)]
    pub verbose: bool,

    /// Pause after every instruction until Enter is pressed
    #[arg(long)]
    pub step: bool,

    /// Milliseconds to sleep between instructions (ignored in step mode)
    #[arg(long, default_value_t = 0)]
    pub clock_period_ms: u64,

    /// Maximum number of steps to execute before giving up (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    pub max_steps: u64,
}
