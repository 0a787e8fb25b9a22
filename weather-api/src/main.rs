//! Binary crate for the `weather-api` server and admin tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Running the HTTP server

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    weather_api::logging::init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
