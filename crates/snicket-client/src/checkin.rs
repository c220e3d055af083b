//! Check-in verification against the contract.

use serde::Serialize;
use tracing::info;

use snicket_chain::TicketContract;
use snicket_shared::types::decimal;
use snicket_shared::{Address, EventId, TokenId};

use crate::error::Result;
use crate::metadata::MetadataSource;
use crate::Ticketing;

pub const EVENT_MISMATCH: &str = "Event mismatch";

/// Result of checking a ticket at the door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinOutcome {
    pub valid: bool,
    #[serde(with = "decimal")]
    pub token_id: TokenId,
    /// The event the ticket was presented for.
    #[serde(with = "decimal")]
    pub event_id: EventId,
    /// The event the ticket actually belongs to.
    #[serde(with = "decimal")]
    pub ticket_event_id: EventId,
    pub owner: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// Verify that `token_id` is a ticket for `expected_event`.
    ///
    /// A ticket for another event is a normal, invalid outcome. Only contract
    /// failures (such as a nonexistent token) are errors.
    pub async fn verify_checkin(
        &self,
        token_id: TokenId,
        expected_event: EventId,
    ) -> Result<CheckinOutcome> {
        let owner = self.contract.owner_of(token_id).await?;
        let ticket_event_id = self.contract.token_event(token_id).await?;

        let valid = ticket_event_id == expected_event;
        info!(%token_id, event_id = %expected_event, %ticket_event_id, %owner, valid, "Check-in verified");

        Ok(CheckinOutcome {
            valid,
            token_id,
            event_id: expected_event,
            ticket_event_id,
            owner,
            reason: (!valid).then(|| EVENT_MISMATCH.to_string()),
        })
    }
}
