//! champscout CLI: top champions and masteries from summoner pages.
//!
//! Reads a saved page or fetches a player's pages, then prints the
//! extracted records as a table or JSON.

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
