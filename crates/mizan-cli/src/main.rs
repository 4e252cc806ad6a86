//! CLI application for Arabic legal-document OCR extraction and
//! backend comparison.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{backends, batch, compare, config, extract};

/// Arabic legal-document OCR - extract text and evaluate OCR backends
#[derive(Parser)]
#[command(name = "mizan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare OCR backends on a document
    Compare(compare::CompareArgs),

    /// Extract a document with a single backend
    Extract(extract::ExtractArgs),

    /// Smart-extract a tree of PDF files
    Batch(batch::BatchArgs),

    /// List registered backends and their availability
    Backends(backends::BackendsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Compare(args) => compare::run(args, cli.config.as_deref()).await,
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Backends(args) => backends::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args).await,
    }
}
