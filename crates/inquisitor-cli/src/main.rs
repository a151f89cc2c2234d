//! Inquisitor CLI - cited answers from web search, cached locally
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

use anyhow::Result;
use clap::Parser as _;
use cli::Cli;
use std::process::ExitCode;

mod cli;
mod handlers;
mod interactive;
mod utils;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose)?;

    handlers::dispatch(cli).await
}
