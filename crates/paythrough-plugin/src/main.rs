//! paythrough plugin entry point.
//!
//! Launched by the node as a plugin. stdout carries the plugin protocol, so
//! all diagnostics go to stderr, which the node folds into its own log.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use paythrough_plugin::{Plugin, PluginConfig};

/// Pay an invoice through a chosen first-hop channel.
#[derive(Parser, Debug)]
#[command(name = "paythrough", version, about = "Core Lightning paythrough plugin")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "paythrough.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &PluginConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.is_json() {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = PluginConfig::load(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);

    // Handle --init flag
    if args.init {
        PluginConfig::default().save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    tracing::info!("paythrough plugin v{}", env!("CARGO_PKG_VERSION"));

    let plugin = Plugin::new(config);
    plugin.run(tokio::io::stdin(), tokio::io::stdout()).await?;

    tracing::info!("paythrough plugin exited cleanly");
    Ok(())
}
