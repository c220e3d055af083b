//! The contract surface consumed by the application.
//!
//! [`TicketContract`] is the seam between the ticketing routines and the chain.
//! [`crate::RpcContract`] implements it over JSON-RPC; tests substitute an
//! in-memory implementation.

use std::future::Future;

use alloy_primitives::{B256, U256};
use snicket_shared::types::to_seconds;
use snicket_shared::{Address, Event, EventId, NewEvent, TokenId};

use crate::error::Result;
use crate::interface::ISnicket;

/// Raw event record as stored by the contract at one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub name: String,
    pub start_time: U256,
    pub end_time: U256,
    pub pre_base_uri: String,
    pub post_base_uri: String,
    pub price_wei: U256,
    pub max_supply: U256,
    pub minted: U256,
    pub organizer: Address,
    pub active: bool,
}

impl From<ISnicket::eventsReturn> for EventRecord {
    fn from(r: ISnicket::eventsReturn) -> Self {
        Self {
            name: r.name,
            start_time: r.startTime,
            end_time: r.endTime,
            pre_base_uri: r.preBaseURI,
            post_base_uri: r.postBaseURI,
            price_wei: r.priceWei,
            max_supply: r.maxSupply,
            minted: r.minted,
            organizer: r.organizer,
            active: r.active,
        }
    }
}

impl EventRecord {
    /// Domain view of this record at storage index `id`, without an image.
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            name: self.name,
            start_time: to_seconds(self.start_time),
            end_time: to_seconds(self.end_time),
            price_wei: self.price_wei,
            max_supply: self.max_supply,
            minted: self.minted,
            active: self.active,
            image: None,
        }
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Read/write access to the ticketing contract.
///
/// Write methods resolve only once the transaction is included; a reverted
/// or failed transaction is an error.
pub trait TicketContract: Send + Sync {
    /// Account used for state-changing calls, `None` when read-only.
    fn signer(&self) -> Option<Address>;

    /// `events(index)`
    fn event(&self, index: EventId) -> impl Future<Output = Result<EventRecord>> + Send;

    /// `tokenEvent(tokenId)`
    fn token_event(&self, token_id: TokenId) -> impl Future<Output = Result<EventId>> + Send;

    /// `tokenURI(tokenId)`
    fn token_uri(&self, token_id: TokenId) -> impl Future<Output = Result<String>> + Send;

    /// `ownerOf(tokenId)`
    fn owner_of(&self, token_id: TokenId) -> impl Future<Output = Result<Address>> + Send;

    /// `getMyTickets(owner)`
    fn tickets_of(&self, owner: Address) -> impl Future<Output = Result<Vec<TokenId>>> + Send;

    /// `buyTicket(eventId)` paying `value_wei`
    fn buy_ticket(
        &self,
        event_id: EventId,
        value_wei: U256,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;

    /// `transferFrom(from, to, tokenId)`
    fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;

    /// `createEvent(...)`
    fn create_event(&self, event: &NewEvent) -> impl Future<Output = Result<TxReceipt>> + Send;
}
