//! Binary crate for the `obra` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive daily-report form
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod form;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
