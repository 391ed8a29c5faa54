mod auth;
mod cli;
mod config;
mod error;
mod feed;
mod output;
mod providers;
mod server;
mod status;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting pipeline-pulse - Azure DevOps status feed");
    cli.execute().await?;

    Ok(())
}
