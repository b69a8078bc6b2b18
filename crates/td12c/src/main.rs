use clap::Parser;
use td12c::{cli::Cli, run};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(message) = run(&cli) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
