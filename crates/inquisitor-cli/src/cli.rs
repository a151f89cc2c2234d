use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for Inquisitor
#[derive(Parser, Debug)]
#[command(name = "inquisitor", version)]
#[command(about = "Get real-time, cited answers from the web", long_about = None)]
#[command(after_help = "Examples:
  inquisitor                                    # Interactive mode
  inquisitor \"What is the capital of France?\"   # Single question
  inquisitor --no-color \"Rust 2024 edition\"     # No color output
  inquisitor recent --count 5                   # Browse the cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(help = "Question to answer (interactive mode when omitted)")]
    pub query: Option<String>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, value_name = "N", value_parser = parse_count, help = "Number of search results to fetch (default: 8)")]
    pub results: Option<usize>,

    #[arg(long, help = "Always search the web, never read or write the cache")]
    pub no_cache: bool,

    #[arg(long, global = true, value_name = "DIR", help = "Cache directory (default: ~/.inquisitor_cache)")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, value_name = "F", value_parser = parse_threshold, help = "Minimum similarity (0.0-1.0) to reuse an answer to a rephrased question")]
    pub threshold: Option<f64>,

    #[arg(short, long, global = true, help = "Log debug information to stderr")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show the most recently cached questions")]
    Recent {
        #[arg(short, long, value_name = "N", help = "Number of entries to show")]
        count: Option<usize>,
    },

    #[command(about = "Find cached questions similar to a question")]
    Search {
        #[arg(help = "Question to compare against the cache")]
        query: String,

        #[arg(long, value_name = "F", value_parser = parse_threshold, help = "Minimum similarity (0.0-1.0)")]
        threshold: Option<f64>,

        #[arg(long, value_name = "N", value_parser = parse_count, help = "Maximum number of matches")]
        max: Option<usize>,
    },

    #[command(about = "Find cached entries whose question or answer contains a term")]
    Find {
        #[arg(help = "Text to look for (case-insensitive)")]
        pattern: String,

        #[arg(long, value_name = "N", value_parser = parse_count, default_value_t = 10, help = "Maximum number of entries")]
        max: usize,
    },

    #[command(about = "Show cache statistics")]
    Stats,

    #[command(about = "Delete every cached entry")]
    Clear {
        #[arg(short, long, help = "Do not ask for confirmation")]
        yes: bool,
    },

    #[command(about = "Show configuration")]
    Config {
        #[arg(long, help = "Show full configuration including defaults")]
        full: bool,
    },
}

/// Parses a similarity threshold within `0.0..=1.0`.
fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|err| format!("`{value}` is not a number: {err}"))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("must be between 0.0 and 1.0, got {threshold}"))
    }
}

/// Parses a count of at least one.
fn parse_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_owned()),
        Ok(count) => Ok(count),
        Err(err) => Err(format!("`{value}` is not a positive integer: {err}")),
    }
}
