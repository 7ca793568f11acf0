mod adb;
mod cli;
mod config;
mod launch;
mod logging;
mod model;
mod registry;
mod router;
mod scanner;
mod session;

use std::process;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
