//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Filter from `RUST_LOG` when set, the configured level otherwise
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }
    EnvFilter::try_new(format!("{},hyper=warn,reqwest=warn", config.level))
        .map_err(|e| anyhow!("invalid log level '{}': {e}", config.level))
}

/// Subscriber for the configured format, writing to `writer`
pub fn subscriber<W>(
    config: &LoggingConfig,
    writer: W,
) -> Result<Box<dyn Subscriber + Send + Sync>>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_target(true)
        .with_writer(writer);

    Ok(match config.format.as_str() {
        "json" => Box::new(builder.json().finish()),
        _ => Box::new(builder.pretty().finish()),
    })
}

/// Install the global subscriber. Logs go to stderr so `resolve` output stays clean.
pub fn init(config: &LoggingConfig) -> Result<()> {
    subscriber(config, std::io::stderr)?
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
