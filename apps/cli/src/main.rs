//! sitefetch CLI: fetch a documentation site and save it as text or JSON.
//!
//! Crawls one host from a seed URL, turns each page into Markdown, and
//! writes the collected pages to stdout or a file.

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
