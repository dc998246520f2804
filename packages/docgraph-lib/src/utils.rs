use crate::config::DocgraphConfig;
use anyhow::Context;
use std::{env, str::FromStr};
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. `HUMAN_LOGGING=false` switches
/// the output from ANSI text to JSON lines.
pub fn init_logging(config: &DocgraphConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());

    // Batch dispatch logs are noisy below `debug`.
    let directives = if config.verbose {
        level
    } else {
        format!("{level},async_graphql=warn")
    };

    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter `{directives}`"))?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(raw) => bool::from_str(&raw).with_context(|| {
            "Expected `true` or `false` to be provided for `HUMAN_LOGGING`"
        })?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {e}"))?;
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {e}"))?;
    }

    tracing::debug!(filter = %directives, human_logging, "Logging initialized.");

    Ok(())
}
