mod cli;
mod clients;
mod config;
mod counter;
mod error;
mod input;
mod invoice;
mod render;
mod run;

use clap::Parser;

use crate::cli::Opts;

fn main() {
    let opts = Opts::parse();

    if let Err(error) = run::run(opts) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}
