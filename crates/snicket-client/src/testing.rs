//! In-memory doubles for [`TicketContract`] and [`MetadataSource`].
//!
//! The mock keeps contract state behind a `std::sync::Mutex` (never held
//! across an await) and records every call, so tests can assert that local
//! validation happened before any contract access.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use snicket_chain::{ChainError, EventRecord, TicketContract, TxReceipt};
use snicket_shared::types::B256;
use snicket_shared::{Address, EventId, NewEvent, TokenId, U256};

use crate::error::{ClientError, Result};
use crate::metadata::MetadataSource;

#[derive(Default)]
struct MockState {
    events: HashMap<EventId, EventRecord>,
    token_events: HashMap<TokenId, EventId>,
    token_uris: HashMap<TokenId, String>,
    owners: HashMap<TokenId, Address>,
    next_token: TokenId,
    calls: Vec<String>,
    unreachable: bool,
    failing: Vec<String>,
    tx_count: u64,
}

/// Contract double holding events and tokens in memory.
#[derive(Default)]
pub struct MockContract {
    signer: Option<Address>,
    state: Mutex<MockState>,
}

impl MockContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn add_event(&self, index: u64, record: EventRecord) {
        self.lock().events.insert(U256::from(index), record);
    }

    /// Give `owner` token `token_id` for event `event_id`.
    pub fn mint(&self, token_id: u64, event_id: u64, owner: Address) {
        let token_id = U256::from(token_id);
        let mut state = self.lock();
        state.token_events.insert(token_id, U256::from(event_id));
        state.owners.insert(token_id, owner);
        state.next_token = state.next_token.max(token_id + U256::from(1));
    }

    pub fn set_token_uri(&self, token_id: u64, uri: impl Into<String>) {
        self.lock().token_uris.insert(U256::from(token_id), uri.into());
    }

    /// Make every subsequent call fail as if the node were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Fail matching calls with a transport error. `pattern` is either a
    /// method name (`"getMyTickets"`) or one rendered call (`"events(5)"`).
    pub fn fail_transport(&self, pattern: impl Into<String>) {
        self.lock().failing.push(pattern.into());
    }

    pub fn owner(&self, token_id: u64) -> Option<Address> {
        self.lock().owners.get(&U256::from(token_id)).copied()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn event_record(&self, index: u64) -> Option<EventRecord> {
        self.lock().events.get(&U256::from(index)).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    fn record(&self, call: String) -> std::result::Result<(), ChainError> {
        let mut state = self.lock();
        let method = call.split('(').next().unwrap_or_default();
        let failing = state.unreachable
            || state.failing.iter().any(|p| *p == call || p == method);
        state.calls.push(call);
        if failing {
            return Err(ChainError::Transport("connection reset by peer".into()));
        }
        Ok(())
    }

    fn receipt(&self) -> TxReceipt {
        let mut state = self.lock();
        state.tx_count += 1;
        TxReceipt {
            tx_hash: B256::from(U256::from(state.tx_count)),
            block_number: Some(state.tx_count),
        }
    }

    fn require_signer(&self) -> std::result::Result<Address, ChainError> {
        self.signer.ok_or(ChainError::NoSigner)
    }
}

impl TicketContract for MockContract {
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn event(&self, index: EventId) -> snicket_chain::Result<EventRecord> {
        self.record(format!("events({index})"))?;
        self.lock()
            .events
            .get(&index)
            .cloned()
            .ok_or_else(|| ChainError::Reverted("invalid event".into()))
    }

    async fn token_event(&self, token_id: TokenId) -> snicket_chain::Result<EventId> {
        self.record(format!("tokenEvent({token_id})"))?;
        self.lock()
            .token_events
            .get(&token_id)
            .copied()
            .ok_or_else(|| ChainError::Reverted("nonexistent token".into()))
    }

    async fn token_uri(&self, token_id: TokenId) -> snicket_chain::Result<String> {
        self.record(format!("tokenURI({token_id})"))?;
        self.lock()
            .token_uris
            .get(&token_id)
            .cloned()
            .ok_or_else(|| ChainError::Reverted("URI query for nonexistent token".into()))
    }

    async fn owner_of(&self, token_id: TokenId) -> snicket_chain::Result<Address> {
        self.record(format!("ownerOf({token_id})"))?;
        self.lock()
            .owners
            .get(&token_id)
            .copied()
            .ok_or_else(|| ChainError::Reverted("ERC721: invalid token ID".into()))
    }

    async fn tickets_of(&self, owner: Address) -> snicket_chain::Result<Vec<TokenId>> {
        self.record(format!("getMyTickets({owner})"))?;
        let state = self.lock();
        let mut ids: Vec<TokenId> = state
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn buy_ticket(&self, event_id: EventId, value_wei: U256) -> snicket_chain::Result<TxReceipt> {
        let buyer = self.require_signer()?;
        self.record(format!("buyTicket({event_id}, {value_wei})"))?;
        {
            let mut state = self.lock();
            let record = state
                .events
                .get_mut(&event_id)
                .ok_or_else(|| ChainError::Reverted("invalid event".into()))?;
            if value_wei != record.price_wei {
                return Err(ChainError::Reverted("Incorrect price".into()));
            }
            if record.minted >= record.max_supply {
                return Err(ChainError::Reverted("Sold out".into()));
            }
            record.minted += U256::from(1);
            let token_id = state.next_token;
            state.next_token += U256::from(1);
            state.token_events.insert(token_id, event_id);
            state.owners.insert(token_id, buyer);
        }
        Ok(self.receipt())
    }

    async fn transfer_from(&self, from: Address, to: Address, token_id: TokenId) -> snicket_chain::Result<TxReceipt> {
        self.require_signer()?;
        self.record(format!("transferFrom({from}, {to}, {token_id})"))?;
        {
            let mut state = self.lock();
            if state.owners.get(&token_id) != Some(&from) {
                return Err(ChainError::Reverted("ERC721: caller is not token owner".into()));
            }
            state.owners.insert(token_id, to);
        }
        Ok(self.receipt())
    }

    async fn create_event(&self, event: &NewEvent) -> snicket_chain::Result<TxReceipt> {
        self.require_signer()?;
        self.record(format!("createEvent({})", event.name))?;
        {
            let mut state = self.lock();
            let index = state
                .events
                .keys()
                .max()
                .map_or(U256::ZERO, |k| k + U256::from(1));
            state.events.insert(
                index,
                EventRecord {
                    name: event.name.clone(),
                    start_time: U256::from(event.start_time),
                    end_time: U256::from(event.end_time),
                    pre_base_uri: event.pre_base_uri.clone(),
                    post_base_uri: event.post_base_uri.clone(),
                    price_wei: event.price_wei,
                    max_supply: event.max_supply,
                    minted: U256::ZERO,
                    organizer: event.organizer,
                    active: true,
                },
            );
        }
        Ok(self.receipt())
    }
}

/// Metadata documents served from a map of URL to JSON.
#[derive(Default)]
pub struct StaticMetadata {
    docs: HashMap<String, Value>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, url: impl Into<String>, doc: Value) -> Self {
        self.docs.insert(url.into(), doc);
        self
    }
}

impl MetadataSource for StaticMetadata {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| ClientError::Metadata(format!("{url} answered 404 Not Found")))
    }
}

/// A well-formed active event record.
pub fn event_record(name: &str, start_time: u64, price_wei: u64, max_supply: u64) -> EventRecord {
    EventRecord {
        name: name.to_string(),
        start_time: U256::from(start_time),
        end_time: U256::from(start_time + 3_600),
        pre_base_uri: "ipfs://".into(),
        post_base_uri: ".json".into(),
        price_wei: U256::from(price_wei),
        max_supply: U256::from(max_supply),
        minted: U256::ZERO,
        organizer: Address::repeat_byte(0x0e),
        active: true,
    }
}
