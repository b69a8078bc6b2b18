use std::fs;

use td12_asm::assemble;
use td12emu::{cli::Cli, run};

fn cli_for(rom: &std::path::Path) -> Cli {
    Cli {
        rom: rom.to_path_buf(),
        machine: "basic".to_string(),
        verbose: false,
        step: false,
        clock_period_ms: 0,
        max_steps: 100,
    }
}

#[test]
fn runs_a_halting_program_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let rom_path = dir.path().join("prog.rom");
    let program = assemble("nop\nhlt\n").unwrap();
    fs::write(&rom_path, program.to_bytes()).unwrap();

    run(&cli_for(&rom_path)).unwrap();
}

#[test]
fn unknown_machine_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let rom_path = dir.path().join("prog.rom");
    let program = assemble("hlt\n").unwrap();
    fs::write(&rom_path, program.to_bytes()).unwrap();

    let mut cli = cli_for(&rom_path);
    cli.machine = "nonexistent".to_string();
    assert!(run(&cli).is_err());
}

#[test]
fn an_infinite_loop_hits_the_step_budget() {
    let dir = tempfile::tempdir().unwrap();
    let rom_path = dir.path().join("loop.rom");
    let program = assemble("start:\nldi :start\nor PC MP ZR\n").unwrap();
    fs::write(&rom_path, program.to_bytes()).unwrap();

    assert!(run(&cli_for(&rom_path)).is_err());
}
