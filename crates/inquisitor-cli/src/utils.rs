//! Utility functions for CLI operations

use anyhow::Result;
use inquisitor_core::InquisitorConfig;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Placeholder shown instead of configured API keys.
const MASKED_KEY: &str = "********";

/// Sends tracing output to stderr so answers on stdout stay clean.
///
/// `RUST_LOG` overrides the default filter.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "inquisitor=debug"
    } else {
        "inquisitor=warn"
    };

    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;
    Ok(())
}

/// Loads `~/.inquisitor/config.toml`, creating it on first run.
///
/// Falls back to defaults if the file cannot be read or is invalid.
pub fn load_config() -> InquisitorConfig {
    InquisitorConfig::load_or_create().unwrap_or_else(|error| {
        tracing::warn!("Failed to load config: {error}");
        tracing::warn!("Using default configuration");
        InquisitorConfig::default()
    })
}

/// Cache directory from the command line, then the config file, then the
/// default location.
///
/// # Errors
/// Returns an error if the home directory cannot be determined
pub fn resolve_cache_dir(
    override_dir: Option<PathBuf>,
    config: &InquisitorConfig,
) -> Result<PathBuf> {
    if let Some(directory) = override_dir {
        return Ok(directory);
    }
    Ok(config.cache.resolve_directory()?)
}

/// Copy of `config` with API keys replaced by a placeholder.
pub fn masked(config: &InquisitorConfig) -> InquisitorConfig {
    let mut masked = config.clone();
    if masked.search.serpapi_key.is_some() {
        masked.search.serpapi_key = Some(MASKED_KEY.to_owned());
    }
    if masked.llm.api_key.is_some() {
        masked.llm.api_key = Some(MASKED_KEY.to_owned());
    }
    masked
}
