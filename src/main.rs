#![forbid(unsafe_code)]

//! tstore — Telemetry Store CLI entry point.

use clap::Parser;

use telemetry_store::cli;

fn main() {
    let args = cli::Cli::parse();
    if let Err(e) = cli::run(&args) {
        eprintln!("tstore: {e}");
        std::process::exit(1);
    }
}
