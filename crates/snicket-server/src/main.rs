//! # snicket-server
//!
//! HTTP service for the Snicket ticketing contract.
//!
//! This binary provides:
//! - **check-in verification** (`/api/checkin`, `/scan`) for door staff
//! - **event listings** with status, filter and sort (`/events`, `/events/featured`)
//! - **ticket listings** per owner, with the check-in link of each ticket
//! - a background **Transfer watcher** that logs ticket movements
//! - **request timeouts** and a **concurrency limit** shielding the RPC node

mod api;
mod config;
mod error;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snicket_chain::{spawn_transfer_watcher, RpcContract, WatcherCommand};
use snicket_client::{HttpMetadata, Ticketing};
use snicket_shared::constants::SOMNIA_CHAIN_ID;
use snicket_shared::gateway::Gateway;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,snicket_server=debug")),
        )
        .init();

    info!("Starting Snicket server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Connect to the contract
    // -----------------------------------------------------------------------
    let contract = RpcContract::connect(&config.contract_config()).await?;
    info!(rpc = %contract.rpc().url(), "Using JSON-RPC endpoint");

    let chain_id = match contract.rpc().chain_id().await {
        Ok(id) => {
            if id != SOMNIA_CHAIN_ID {
                warn!(chain_id = id, expected = SOMNIA_CHAIN_ID, "Connected to an unexpected chain");
            }
            id
        }
        Err(e) => {
            warn!(error = %e, "Could not read chain id, assuming Somnia");
            SOMNIA_CHAIN_ID
        }
    };

    let ticketing = Ticketing::new(
        contract.clone(),
        HttpMetadata::with_timeout(config.rpc_timeout)?,
        Gateway::new(config.ipfs_gateway.clone()),
    )
    .with_scan_max(config.scan_max);

    let app_state = AppState {
        ticketing: Arc::new(ticketing),
        config: Arc::new(config.clone()),
        chain_id,
    };

    // -----------------------------------------------------------------------
    // 4. Spawn the Transfer watcher
    // -----------------------------------------------------------------------
    let watcher = match spawn_transfer_watcher(contract.rpc(), contract.address(), config.poll_interval).await {
        Ok((cmd_tx, mut notifications)) => {
            tokio::spawn(async move {
                while let Some(n) = notifications.recv().await {
                    info!(token_id = %n.token_id, from = %n.from, to = %n.to, block = ?n.block, "Ticket moved");
                }
            });
            Some(cmd_tx)
        }
        Err(e) => {
            warn!(error = %e, "Transfer watcher unavailable");
            None
        }
    };

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    if let Some(cmd_tx) = watcher {
        let _ = cmd_tx.send(WatcherCommand::Shutdown).await;
    }

    Ok(())
}
