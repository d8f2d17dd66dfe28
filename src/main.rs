// Entrypoint for the CLI application.
// - Loads `.env` and configuration before logging is set up.
// - Keeps `main` small: build the client and hand it to the UI flow.

use anyhow::Result;
use selfie_analyzer::{api::FalClient, config, ui};
use tracing::debug;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = validate_log_level(&config.log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // RUST_LOG wins over the configured level. Logs go to stderr so they
    // stay out of the console output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(upload_url = %config.upload_url, model_url = %config.model_url, "configuration loaded");

    let api = FalClient::new(&config)?;
    let outcome = ui::session(&api, &config)?;
    debug!(?outcome, "session finished");
    Ok(())
}
