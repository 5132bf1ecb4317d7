//! FaceLink CLI
//!
//! Command-line front end for the FaceLink substitution core.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use tracing_subscriber::EnvFilter;

use facelink::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    // log records go through env_logger; only tracing events use this subscriber
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("installing tracing subscriber")?;

    info!("FaceLink v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("FaceLink v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::InitConfig { path } => commands::init_config(&path)
            .with_context(|| format!("writing config to {}", path.display())),
        Commands::CheckConfig { path } => commands::check_config(&path)
            .with_context(|| format!("checking config {}", path.display())),
        Commands::Substitute {
            host,
            replacement,
            config,
            frames,
        } => commands::substitute(&host, &replacement, config.as_deref(), frames)
            .context("substitution failed"),
    }
}
