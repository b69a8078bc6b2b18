use std::fs;

use td12asm::{cli::Cli, run};

fn cli_for(input: &std::path::Path, output: &std::path::Path, labels: &std::path::Path) -> Cli {
    Cli {
        input: input.to_path_buf(),
        output: Some(output.to_path_buf()),
        labels: Some(labels.to_path_buf()),
        hex: None,
    }
}

#[test]
fn assembles_a_program_and_writes_rom_plus_labels() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.asm");
    let output = dir.path().join("prog.rom");
    let labels = dir.path().join("prog.labels");
    fs::write(&input, "ldi 5\nldi :l\nl:\n").unwrap();

    run(&cli_for(&input, &output, &labels)).unwrap();

    let rom = fs::read(&output).unwrap();
    assert_eq!(rom.len(), 0xa80);
    let listing = fs::read_to_string(&labels).unwrap();
    assert_eq!(listing, "0x002, l");
}

#[test]
fn assembly_errors_are_reported_and_no_rom_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.asm");
    let output = dir.path().join("bad.rom");
    let labels = dir.path().join("bad.labels");
    fs::write(&input, "not_a_real_mnemonic\n").unwrap();

    assert!(run(&cli_for(&input, &output, &labels)).is_err());
    assert!(!output.exists());
}
