use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    build::{self, BuildArgs},
    discover::{self, DiscoverArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "suite", about = "Parameter-sweep suite builder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a sweep plan and write one input directory per case.
    Build(BuildArgs),
    /// Rebuild a suite from case files on disk and print its summary.
    Discover(DiscoverArgs),
    /// Run an external program once per discovered case.
    Run(RunArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => build::run(&args),
        Command::Discover(args) => discover::run(&args),
        Command::Run(args) => run::run(&args),
    }
}
