//! Contract access for the Snicket ticketing contract over JSON-RPC.

pub mod client;
pub mod contract;
pub mod error;
pub mod interface;
pub mod rpc;
pub mod watcher;

pub use client::{ContractConfig, RpcContract};
pub use contract::{EventRecord, TicketContract, TxReceipt};
pub use error::{ChainError, Result};
pub use interface::ISnicket;
pub use rpc::RpcClient;
pub use watcher::{spawn_transfer_watcher, TransferNotification, WatcherCommand};
