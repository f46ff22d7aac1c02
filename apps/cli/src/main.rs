//! pepsum CLI — PEP-grounded summaries of Python operators and functions.
//!
//! Resolves related PEPs via an LLM, fetches their pages, and prints a
//! structured summary per operator.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
