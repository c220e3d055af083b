//! Ticket listing for an owner.

use tracing::{debug, info, warn};

use snicket_chain::TicketContract;
use snicket_shared::constants::{PLACEHOLDER_TICKET_IMAGE, UNKNOWN_EVENT_NAME};
use snicket_shared::gateway::is_fetchable;
use snicket_shared::types::to_seconds;
use snicket_shared::{Address, EventId, Ticket, TicketMetadata, TokenId};

use crate::error::Result;
use crate::metadata::MetadataSource;
use crate::Ticketing;

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// List every ticket `owner` holds.
    ///
    /// Only the owned-ids call can fail the listing; per-token lookups fall
    /// back to placeholders and the token is always kept.
    pub async fn list_tickets(&self, owner: Address) -> Result<Vec<Ticket>> {
        let token_ids = self.contract.tickets_of(owner).await?;

        let mut tickets = Vec::with_capacity(token_ids.len());
        for token_id in token_ids {
            tickets.push(self.load_ticket(token_id).await);
        }

        info!(%owner, count = tickets.len(), "Loaded tickets");
        Ok(tickets)
    }

    async fn load_ticket(&self, token_id: TokenId) -> Ticket {
        let event_id = match self.contract.token_event(token_id).await {
            Ok(id) => id,
            Err(e) => {
                debug!(%token_id, error = %e, "tokenEvent failed, using event 0");
                EventId::ZERO
            }
        };

        let mut event_name = UNKNOWN_EVENT_NAME.to_string();
        let mut start_time = 0;
        match self.contract.event(event_id).await {
            Ok(record) => {
                if !record.name.is_empty() {
                    event_name = record.name;
                }
                start_time = to_seconds(record.start_time);
            }
            Err(e) => warn!(%token_id, %event_id, error = %e, "Failed loading event for ticket"),
        }

        let metadata = self.token_metadata(token_id).await;
        let image_url = metadata
            .as_ref()
            .and_then(|m| m.image.as_deref())
            .filter(|img| !img.is_empty())
            .map(|img| self.gateway.resolve(img))
            .unwrap_or_else(|| PLACEHOLDER_TICKET_IMAGE.to_string());

        Ticket {
            token_id,
            event_id,
            event_name,
            image_url,
            metadata,
            start_time,
        }
    }

    async fn token_metadata(&self, token_id: TokenId) -> Option<TicketMetadata> {
        let uri = self.contract.token_uri(token_id).await.ok()?;
        let url = self.gateway.resolve(&uri);
        if !is_fetchable(&url) {
            return None;
        }
        let doc = match self.metadata.fetch_json(&url).await {
            Ok(doc) => doc,
            Err(e) => {
                debug!(%token_id, url = %url, error = %e, "Ticket metadata unavailable");
                return None;
            }
        };
        match serde_json::from_value(doc) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                debug!(%token_id, url = %url, error = %e, "Ticket metadata is not an object");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use snicket_shared::gateway::Gateway;
    use snicket_shared::{Address, U256};

    use crate::testing::{event_record, MockContract, StaticMetadata};
    use crate::{ClientError, Ticketing};

    const OWNER: Address = Address::new([0x42; 20]);

    #[tokio::test]
    async fn test_two_tokens_same_event() {
        let contract = MockContract::new();
        contract.add_event(1, event_record("Jazz Night", 1_700_000_000, 1, 50));
        contract.mint(3, 1, OWNER);
        contract.mint(7, 1, OWNER);
        contract.mint(9, 1, Address::repeat_byte(0x01));

        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());
        let tickets = t.list_tickets(OWNER).await.unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].token_id, U256::from(3));
        assert_eq!(tickets[1].token_id, U256::from(7));
        for ticket in &tickets {
            assert_eq!(ticket.event_id, U256::from(1));
            assert_eq!(ticket.event_name, "Jazz Night");
            assert_eq!(ticket.start_time, 1_700_000_000);
            assert_eq!(ticket.image_url, "/event-ticket.png");
        }
    }

    #[tokio::test]
    async fn test_per_token_lookup_order() {
        let contract = MockContract::new();
        contract.add_event(2, event_record("Expo", 10, 1, 50));
        contract.mint(5, 2, OWNER);

        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());
        t.list_tickets(OWNER).await.unwrap();

        let calls = t.contract().calls();
        assert_eq!(
            calls,
            vec![
                format!("getMyTickets({OWNER})"),
                "tokenEvent(5)".to_string(),
                "events(2)".to_string(),
                "tokenURI(5)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_event_falls_back() {
        let contract = MockContract::new();
        contract.mint(4, 9, OWNER);

        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());
        let tickets = t.list_tickets(OWNER).await.unwrap();

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].event_name, "Unknown Event");
        assert_eq!(tickets[0].start_time, 0);
        assert!(tickets[0].metadata.is_none());
    }

    #[tokio::test]
    async fn test_metadata_image_resolved() {
        let contract = MockContract::new();
        contract.add_event(0, event_record("Gig", 10, 1, 50));
        contract.mint(1, 0, OWNER);
        contract.set_token_uri(1, "ipfs://cid/1.json");

        let metadata = StaticMetadata::new().with_doc(
            "https://ipfs.io/ipfs/cid/1.json",
            json!({
                "name": "Gig #1",
                "image": "ipfs://cid/1.png",
                "attributes": [{ "trait_type": "Tier", "value": "VIP" }],
            }),
        );

        let t = Ticketing::new(contract, metadata, Gateway::default());
        let tickets = t.list_tickets(OWNER).await.unwrap();

        assert_eq!(tickets[0].image_url, "https://ipfs.io/ipfs/cid/1.png");
        let metadata = tickets[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Gig #1"));
        assert_eq!(metadata.extra["attributes"][0]["value"], "VIP");
    }

    #[tokio::test]
    async fn test_owned_ids_failure_is_surfaced() {
        let contract = MockContract::new();
        contract.set_unreachable(true);

        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());
        let err = t.list_tickets(OWNER).await.unwrap_err();
        assert!(matches!(err, ClientError::Chain(_)));
    }

    #[tokio::test]
    async fn test_failed_token_lookups_keep_the_ticket() {
        let contract = MockContract::new();
        contract.add_event(0, event_record("Gig", 10, 1, 50));
        contract.mint(6, 0, OWNER);
        contract.fail_transport("tokenEvent");
        contract.fail_transport("tokenURI");

        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());
        let tickets = t.list_tickets(OWNER).await.unwrap();

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].token_id, U256::from(6));
        // event 0 is the fallback when tokenEvent fails
        assert_eq!(tickets[0].event_name, "Gig");
        assert_eq!(tickets[0].image_url, "/event-ticket.png");
    }
}
