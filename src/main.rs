//! Snakk CLI entry point.

use anyhow::Result;
use clap::Parser;
use snakk::cli::{commands, Cli, Commands};
use snakk::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("snakk={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Serve { host, port, checkpoint } => {
            let mut settings = settings;
            if let Some(provider) = checkpoint {
                settings.checkpoint.provider = provider.clone();
            }
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Ask { prompt, model } => {
            commands::run_ask(prompt, model.clone(), settings).await?;
        }

        Commands::Chat { model, thread } => {
            commands::run_chat(model.clone(), thread.clone(), settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
