//! # snicket-client
//!
//! Ticketing routines over the Snicket contract:
//! - **event discovery** by a bounded scan of contract storage
//! - **ticket listing** for an owner, with best-effort display data
//! - **purchase**, **transfer** and **event creation** flows
//! - **check-in verification** of a ticket against an expected event
//!
//! Every routine re-reads the contract; nothing is cached between calls.

pub mod checkin;
pub mod events;
pub mod metadata;
pub mod organizer;
pub mod purchase;
pub mod tickets;
pub mod transfer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

mod error;

use snicket_chain::TicketContract;
use snicket_shared::constants::SCAN_MAX;
use snicket_shared::gateway::Gateway;

pub use checkin::CheckinOutcome;
pub use error::{ClientError, Result};
pub use metadata::{HttpMetadata, MetadataSource};
pub use transfer::TransferOutcome;

/// A contract handle plus the metadata source used to decorate its results.
pub struct Ticketing<C, M> {
    contract: C,
    metadata: M,
    gateway: Gateway,
    scan_max: u64,
}

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    pub fn new(contract: C, metadata: M, gateway: Gateway) -> Self {
        Self {
            contract,
            metadata,
            gateway,
            scan_max: SCAN_MAX,
        }
    }

    /// Override the number of event indices scanned by discovery.
    pub fn with_scan_max(mut self, scan_max: u64) -> Self {
        self.scan_max = scan_max;
        self
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn scan_max(&self) -> u64 {
        self.scan_max
    }
}
