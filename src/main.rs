use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seoul_air_locator::{
    Coordinate, FixedPositionProvider, IpPositionProvider, LocationResolver, LocatorConfig,
    LocatorError, PositionProvider, api::AppState, logging, web,
};

#[derive(Debug, Parser)]
#[command(name = "seoul-air-locator", version)]
#[command(about = "Location, district and air-quality resolution for Seoul")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Resolve once and print the result as JSON.
    /// Without coordinates the position is looked up by IP.
    Resolve {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{e:?}");
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// Friendly text for locator failures, the full chain for anything else
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LocatorError>() {
        Some(locator) => locator.user_message(),
        None => format!("Error: {err:#}"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = LocatorConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState::from_config(&config).context("Failed to create API clients")?;
            web::run(&config.server, state).await
        }
        Commands::Resolve { lat, lon } => {
            let position: Arc<dyn PositionProvider> = match lat.zip(lon) {
                Some((lat, lon)) => {
                    Arc::new(FixedPositionProvider::new(Coordinate::new(lat, lon)))
                }
                None => Arc::new(IpPositionProvider::new(&config.position)?),
            };
            let resolver = LocationResolver::from_config(&config, position)?;
            let resolved = resolver.resolve().await;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(())
        }
    }
}
