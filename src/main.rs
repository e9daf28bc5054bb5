//! pdfcast CLI entry point.

use anyhow::Result;
use clap::Parser;
use pdfcast::cli::{commands, Cli, Commands};
use pdfcast::config::Settings;
use pdfcast::orchestrator::PodcastRequest;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    // Load configuration before logging so the configured level applies
    let settings = match &cli.config {
        Some(_) => Settings::load_from(&config_path),
        None => Settings::load(),
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings
            .as_ref()
            .map(|s| s.general.log_level.clone())
            .unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pdfcast={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let result = match settings {
        Ok(settings) => run(cli, settings, config_path).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, settings: Settings, config_path: PathBuf) -> Result<()> {
    match cli.command {
        Commands::Generate {
            pdf,
            format,
            length,
            style,
            preference,
            output_dir,
            skip_to,
        } => {
            let request = PodcastRequest {
                pdf,
                format,
                length,
                style,
                preference,
                skip_to,
            };
            commands::run_generate(request, output_dir, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &settings, &config_path)?;
        }
    }

    Ok(())
}
