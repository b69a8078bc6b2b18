//! td12emu - emulator driver.
//!
//! Loads a ROM file, wires up the selected device assembly, and steps the
//! machine to completion. Exit code is the driver's concern: zero on clean
//! halt, nonzero on a decode error or any other uncaught failure.

pub mod cli;
pub mod device;
pub mod machine;

use std::fs;
use std::thread;
use std::time::Duration;

use td12_emu::{Computer, Memory};

pub use cli::Cli;

/// Runs the machine selected by `cli` to completion (halt, step budget
/// exhaustion, or decode error).
pub fn run(cli: &Cli) -> Result<(), String> {
    let bytes =
        fs::read(&cli.rom).map_err(|e| format!("error: could not read {}: {e}", cli.rom.display()))?;
    let words = Memory::load_rom_bytes(&bytes);
    let devices = machine::devices_for(&cli.machine)?;
    let mem = Memory::new(words, devices).map_err(|e| format!("error: {e}"))?;
    let mut computer = Computer::new(mem);

    let mut steps: u64 = 0;
    while !computer.halted() {
        if cli.verbose {
            eprintln!("; pc={:#05x}", computer.registers.pc);
        }
        computer.step().map_err(|e| format!("error: {e}"))?;
        steps += 1;

        if cli.max_steps != 0 && steps >= cli.max_steps {
            return Err(format!("error: exceeded step budget of {}", cli.max_steps));
        }
        if cli.step {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
        } else if cli.clock_period_ms > 0 {
            thread::sleep(Duration::from_millis(cli.clock_period_ms));
        }
    }

    Ok(())
}
