//! `ferry completions` command

use std::io;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsArgs};

pub fn execute(args: CompletionsArgs) -> Result<()> {
    generate(
        args.shell,
        &mut Cli::command(),
        env!("CARGO_BIN_NAME"),
        &mut io::stdout().lock(),
    );
    Ok(())
}
