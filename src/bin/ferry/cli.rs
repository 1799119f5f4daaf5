//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// ferry - transfer an artifact and its dependency closure between repositories
#[derive(Parser)]
#[command(name = "ferry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy an artifact, its dependencies and their parent descriptors to a target repository
    Transfer(TransferArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct TransferArgs {
    /// Root artifact: group:name[:extension[:classifier]]:version
    pub coordinate: String,

    /// Target repository URL (defaults to [target] in the config)
    #[arg(long, short)]
    pub target: Option<String>,

    /// Additional source repository as ID=URL, searched after the configured ones
    #[arg(long = "repo", value_name = "ID=URL")]
    pub repos: Vec<String>,

    /// Username for the target repository
    #[arg(long)]
    pub username: Option<String>,

    /// Password for the target repository
    #[arg(long, env = "FERRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Classifier of the root artifact
    #[arg(long)]
    pub classifier: Option<String>,

    /// Extension of the root artifact
    #[arg(long)]
    pub extension: Option<String>,

    /// Resolve everything but do not upload
    #[arg(long)]
    pub dry_run: bool,

    /// Only use the local cache
    #[arg(long)]
    pub offline: bool,

    /// Print the transfer report as JSON. Its `root` includes any
    /// `--classifier` and `--extension`
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
