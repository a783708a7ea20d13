// src/main.rs
// expense-gateway - command-line client for the expense tracker API

use anyhow::Result;
use clap::Parser;
use expense_gateway::cli::{self, Cli};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads EXPENSE_GATEWAY_* defaults
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    cli::run(cli).await
}
