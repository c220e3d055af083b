//! Background watcher for `Transfer` logs emitted by the ticketing contract.
//!
//! Runs in a dedicated tokio task that polls `eth_getLogs`. Callers talk to
//! it through a command channel and receive [`TransferNotification`]s, which
//! is how a ticket list learns it has gone stale.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use alloy_sol_types::SolEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use snicket_shared::{Address, TokenId};

use crate::error::Result;
use crate::interface::ISnicket::Transfer;
use crate::rpc::{RawLog, RpcClient};

/// Widest block range requested from `eth_getLogs` in one poll.
pub const MAX_LOG_SPAN: u64 = 2_000;

/// Commands sent *into* the watcher task.
#[derive(Debug)]
pub enum WatcherCommand {
    Shutdown,
}

/// A ticket changed hands (or was minted, with `from` = zero address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotification {
    pub from: Address,
    pub to: Address,
    pub token_id: TokenId,
    pub block: Option<u64>,
}

impl TransferNotification {
    /// Whether `account` sent or received the ticket.
    pub fn involves(&self, account: &Address) -> bool {
        self.from == *account || self.to == *account
    }
}

/// Decode a `Transfer(address,address,uint256)` log.
///
/// ERC-721 indexes the token id as the fourth topic; a non-indexed id in the
/// data section is accepted too.
pub fn parse_transfer_log(log: &RawLog) -> Option<TransferNotification> {
    if *log.topics.first()? != Transfer::SIGNATURE_HASH {
        return None;
    }

    let decoded = Transfer::decode_raw_log(log.topics.iter().copied(), &log.data, true);
    let (from, to, token_id) = match decoded {
        Ok(event) => (event.from, event.to, event.tokenId),
        Err(_) if log.topics.len() == 3 => (
            Address::from_word(log.topics[1]),
            Address::from_word(log.topics[2]),
            U256::try_from_be_slice(log.data.get(..32)?)?,
        ),
        Err(_) => return None,
    };

    Some(TransferNotification {
        from,
        to,
        token_id,
        block: log.block_number.map(|n| n.to::<u64>()),
    })
}

/// Next `(from, to)` block window to fetch, or `None` when caught up.
///
/// The window never spans more than `max_span` blocks; a watcher that fell
/// behind catches up over several polls.
pub fn log_window(next_block: u64, head: u64, max_span: u64) -> Option<(u64, u64)> {
    if head < next_block {
        return None;
    }
    let last = next_block.saturating_add(max_span.max(1) - 1);
    Some((next_block, head.min(last)))
}

/// Spawn the watcher in a background tokio task.
///
/// Watching starts after the current head block. The task exits on
/// [`WatcherCommand::Shutdown`] or once the notification receiver is dropped.
///
/// # Returns
///
/// `(command_tx, notification_rx)`
pub async fn spawn_transfer_watcher(
    rpc: Arc<RpcClient>,
    contract: Address,
    poll_interval: Duration,
) -> Result<(
    mpsc::Sender<WatcherCommand>,
    mpsc::Receiver<TransferNotification>,
)> {
    let mut next_block = rpc.block_number().await? + 1;

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<WatcherCommand>(8);
    let (notif_tx, notif_rx) = mpsc::channel::<TransferNotification>(256);

    info!(%contract, from_block = next_block, "Transfer watcher started");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(WatcherCommand::Shutdown) | None => {
                            info!("Transfer watcher shutting down");
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    let head = match rpc.block_number().await {
                        Ok(head) => head,
                        Err(e) => {
                            warn!(error = %e, "Failed to read head block");
                            continue;
                        }
                    };
                    let Some((from, to)) = log_window(next_block, head, MAX_LOG_SPAN) else {
                        continue;
                    };

                    let logs = match rpc.logs(&contract, Transfer::SIGNATURE_HASH, from, to).await {
                        Ok(logs) => logs,
                        Err(e) => {
                            warn!(error = %e, from, to, "Failed to fetch Transfer logs");
                            continue;
                        }
                    };
                    next_block = to.saturating_add(1);

                    for log in &logs {
                        let Some(notification) = parse_transfer_log(log) else {
                            debug!(tx = ?log.transaction_hash, "Skipping malformed Transfer log");
                            continue;
                        };
                        debug!(
                            token_id = %notification.token_id,
                            from = %notification.from,
                            to = %notification.to,
                            "Transfer observed"
                        );
                        if notif_tx.send(notification).await.is_err() {
                            info!("Transfer receiver dropped, stopping watcher");
                            return;
                        }
                    }
                }
            }
        }
    });

    Ok((cmd_tx, notif_rx))
}
