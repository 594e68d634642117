mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagekit", version)]
#[command(about = "Static-asset build orchestration with a live-reloading dev server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding pages.config.toml and the source tree
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete the dist and temp directories
    Clean,
    /// Produce a deployable site in dist
    Build,
    /// Compile, serve and rebuild on change
    Develop {
        /// Port for the dev server (overrides the config)
        #[arg(long)]
        port: Option<u16>,
        /// Do not open a browser window
        #[arg(long, action)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    // RUST_LOG wins over the flags.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Clean => commands::cmd_clean(&cli.cwd).await?,
        Commands::Build => commands::cmd_build(&cli.cwd).await?,
        Commands::Develop { port, no_open } => {
            commands::cmd_develop(&cli.cwd, port, no_open).await?
        }
    }

    Ok(())
}
