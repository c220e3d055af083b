use tracing::info;

use snicket_chain::{ChainError, TicketContract, TxReceipt};
use snicket_shared::{Event, EventId, U256};

use crate::error::{ClientError, Result};
use crate::metadata::MetadataSource;
use crate::Ticketing;

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// Buy one ticket for `event_id`, paying `price_wei`.
    pub async fn buy_ticket(&self, event_id: EventId, price_wei: U256) -> Result<TxReceipt> {
        if self.contract.signer().is_none() {
            return Err(ChainError::NoSigner.into());
        }

        let receipt = self.contract.buy_ticket(event_id, price_wei).await?;
        info!(%event_id, %price_wei, tx = %receipt.tx_hash, "Ticket purchased");
        Ok(receipt)
    }

    /// Buy a ticket for a discovered event, refusing locally when it is
    /// inactive or sold out.
    pub async fn purchase_event(&self, event: &Event) -> Result<TxReceipt> {
        if !event.active || event.is_sold_out() {
            return Err(ClientError::EventUnavailable(event.id));
        }
        self.buy_ticket(event.id, event.price_wei).await
    }
}

#[cfg(test)]
mod tests {
    use snicket_chain::ChainError;
    use snicket_shared::gateway::Gateway;
    use snicket_shared::{Address, U256};

    use crate::testing::{event_record, MockContract, StaticMetadata};
    use crate::{ClientError, Ticketing};

    const BUYER: Address = Address::new([0xb1; 20]);

    #[tokio::test]
    async fn test_purchase_mints_ticket() {
        let contract = MockContract::new().with_signer(BUYER);
        contract.add_event(0, event_record("Show", 10, 500, 2));
        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());

        let event = t.discover_events().await.unwrap().remove(0);
        t.purchase_event(&event).await.unwrap();

        assert_eq!(t.contract().event_record(0).unwrap().minted, U256::from(1));
        let tickets = t.list_tickets(BUYER).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].event_name, "Show");
    }

    #[tokio::test]
    async fn test_sold_out_refused_locally() {
        let contract = MockContract::new().with_signer(BUYER);
        let mut record = event_record("Full", 10, 500, 1);
        record.minted = U256::from(1);
        contract.add_event(0, record);
        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());

        let event = t.discover_events().await.unwrap().remove(0);
        let calls_before = t.contract().calls().len();

        let err = t.purchase_event(&event).await.unwrap_err();
        assert!(matches!(err, ClientError::EventUnavailable(id) if id == U256::ZERO));
        assert_eq!(t.contract().calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_purchase_without_wallet() {
        let contract = MockContract::new();
        contract.add_event(0, event_record("Show", 10, 500, 2));
        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());

        let err = t.buy_ticket(U256::ZERO, U256::from(500)).await.unwrap_err();
        assert!(matches!(err, ClientError::Chain(ChainError::NoSigner)));
    }

    #[tokio::test]
    async fn test_contract_rejection_is_surfaced() {
        let contract = MockContract::new().with_signer(BUYER);
        contract.add_event(0, event_record("Show", 10, 500, 2));
        let t = Ticketing::new(contract, StaticMetadata::new(), Gateway::default());

        let err = t.buy_ticket(U256::ZERO, U256::from(1)).await.unwrap_err();
        match err {
            ClientError::Chain(e) => assert_eq!(e.reason(), "Incorrect price"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
