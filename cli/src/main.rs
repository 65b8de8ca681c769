use clap::Parser;
use cli::cli::args::Cli;

use cli::{cli::runner::run_cli, logger};
use std::process;

fn main() {
    let args = Cli::parse();

    if let Err(e) = logger::init(args.verbose) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let exit_code = match run_cli(args) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{}", e);
            1
        }
    };

    process::exit(exit_code);
}
