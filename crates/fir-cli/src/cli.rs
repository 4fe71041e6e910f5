use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "firl",
    about = "FIR Ledger: tamper-evident case records with replayable access control",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log ledger and replay internals to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Registry configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the built-in walkthrough: register, attach, request, approve, transfer, map
    Demo(DemoArgs),
    /// Execute a scripted session against a fresh in-memory registry
    Run(RunArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Override the mining difficulty
    #[arg(long)]
    pub difficulty: Option<usize>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the session script (TOML)
    pub script: PathBuf,

    /// Override the mining difficulty
    #[arg(long)]
    pub difficulty: Option<usize>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Ignore --config and print the built-in defaults
    #[arg(long)]
    pub defaults: bool,
}
