//! ferry CLI - transfer artifacts and their dependency closure between repositories

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use ferry::util::diagnostic::emit;
use ferry::TransferError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<TransferError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ferry=debug")
    } else {
        EnvFilter::new("ferry=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Transfer(args) => commands::transfer::execute(args, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
