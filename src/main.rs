//! Swap Widget MCP Server
//!
//! Serves the wallet session and token approval tools over stdio.

use std::sync::Arc;

use rmcp::ServiceExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use swap_widget::{ethereum::CHAIN_POLL_INTERVAL, Config, LocalWallet, SwapWidgetServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging; stdout carries the MCP transport
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting swap widget MCP server");

    let wallet = Arc::new(LocalWallet::from_private_key(&config.private_key, &config.rpc_url)?);
    let server = SwapWidgetServer::with_wallet(&config, wallet.clone())?;

    // Follow wallet account and chain changes for as long as we serve
    let listener = server.store().mount();
    let _chain_monitor = wallet.monitor_chain(CHAIN_POLL_INTERVAL);

    let transport = rmcp::transport::stdio();
    let running = server.serve(transport).await?;

    running.waiting().await?;

    if let Some(listener) = listener {
        listener.unmount().await;
    }

    Ok(())
}
