mod api;
mod auth;
mod cli;
mod config;
mod daemon;
mod fifo;
mod models;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{App, Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Credentials may live in a .env file next to where the daemon is started
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut app = App::new(cli.config.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        match cli.command {
            Commands::Run {
                manual,
                format,
                interval,
            } => app.run(manual, format, interval).await,
            Commands::Send { command } => app.send(command).await,
            Commands::Status => app.status().await,
        }
    });

    // Pipe opens parked on the blocking pool never return on their own
    runtime.shutdown_background();
    result
}
