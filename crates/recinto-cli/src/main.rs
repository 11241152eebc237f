//! Recinto CLI - room acoustic parameters from measured impulse responses.

mod commands;
mod discovery;
mod pool;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recinto")]
#[command(author, version, about = "Room acoustic parameter extraction", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract LF_early, LF_late and DR from one recording
    Extract(commands::extract::ExtractArgs),

    /// Analyse every recording under a measurement directory
    Batch(commands::batch::BatchArgs),

    /// Generate synthetic impulse responses
    Generate(commands::generate::GenerateArgs),

    /// Per-type statistics of a results table
    Summarize(commands::summarize::SummarizeArgs),

    /// Split a results table into one file per measurement
    Split(commands::split::SplitArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Batch(args) => commands::batch::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Summarize(args) => commands::summarize::run(args),
        Commands::Split(args) => commands::split::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
