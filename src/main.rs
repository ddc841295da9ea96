//! Inventario server binary
//!
//! Parses configuration from flags and environment, then serves the API.

use clap::Parser;
use inventario::api::ApiServer;
use inventario::config::{ServerArgs, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = ServerArgs::parse();

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: ServerArgs) -> anyhow::Result<()> {
    let config = ServerConfig::from_args(&args)?;
    tracing::debug!(
        port = config.port,
        bind = %config.bind,
        cors = ?config.cors,
        index = %config.index_path.display(),
        "Resolved configuration"
    );

    ApiServer::new(config).run().await?;
    Ok(())
}
