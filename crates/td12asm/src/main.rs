use clap::Parser;
use td12asm::{cli::Cli, run};

fn main() {
    let cli = Cli::parse();

    if let Err(message) = run(&cli) {
        if !message.is_empty() {
            eprintln!("{message}");
        }
        std::process::exit(1);
    }
}
