use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "mindgym")]
#[command(about = "Achievement unlocks for brain-training games")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.mindgym/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep progress in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a finished run and show any unlocked achievements
    Submit {
        /// Game id (e.g. "schulte")
        game: String,

        /// Variant key (e.g. "5x5", "4x4-20", "8-perfect")
        variant: String,

        /// Score value, lower is better (seconds for timed games)
        value: f64,

        /// The run had no mistakes
        #[arg(long)]
        perfect: bool,

        /// Exit without waiting for notifications to finish
        #[arg(long)]
        no_wait: bool,
    },

    /// Show unlocked tiers and score history
    Status {
        /// Only show this game
        #[arg(long)]
        game: Option<String>,
    },

    /// Reconcile stored progress with the achievement catalog
    Sync,

    /// List achievement definitions
    Catalog,

    /// Write a default ~/.mindgym/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with notifications
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let ctx = cli::Context::new(cli.config, cli.ephemeral);

    match cli.command {
        Commands::Submit {
            game,
            variant,
            value,
            perfect,
            no_wait,
        } => {
            cli::submit::submit_command(&ctx, &game, &variant, value, perfect, no_wait).await?;
        }
        Commands::Status { game } => {
            cli::status::status_command(&ctx, game.as_deref()).await?;
        }
        Commands::Sync => {
            cli::sync::sync_command(&ctx).await?;
        }
        Commands::Catalog => {
            cli::catalog::catalog_command(&ctx)?;
        }
        Commands::Init { force } => {
            cli::init::init_command(ctx.config_path.clone(), force)?;
        }
    }

    Ok(())
}
