//! Callfold CLI entry point

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "callfold")]
#[command(about = "Fold Rust call sites into a call graph of declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root holding callfold.toml and the cache (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file to use instead of <root>/callfold.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Files and directories to build (defaults to the root)
    paths: Vec<PathBuf>,

    /// Where to write the DOT text; "-" for stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail on syntax errors instead of building from the recovered tree
    #[arg(long)]
    strict: bool,

    /// Ignore and do not update the result cache
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the call graph once
    Build(BuildArgs),
    /// Build, then rebuild whenever a source file changes
    Watch {
        /// Files and directories to watch (defaults to the root)
        paths: Vec<PathBuf>,

        /// Where to write the DOT text
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inspect or clear the result cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show cached entry count and size
    Stats,
    /// Delete the cache directory
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--output -` keeps stdout clean.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("callfold={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Callfold v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Project root: {}", cli.root.display());

    if let Commands::Version = cli.command {
        println!("callfold v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = commands::load_config(&cli.root, cli.config.as_deref())?;

    match cli.command {
        Commands::Build(args) => commands::build(cli.root, config, args).await,
        Commands::Watch { paths, output } => commands::watch(cli.root, config, paths, output).await,
        Commands::Cache { action: CacheCommand::Stats } => commands::cache_stats(&cli.root, &config),
        Commands::Cache { action: CacheCommand::Clear } => commands::cache_clear(&cli.root, &config),
        Commands::Version => Ok(()),
    }
}
