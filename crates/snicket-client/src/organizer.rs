use tracing::info;

use snicket_chain::{ChainError, TicketContract, TxReceipt};
use snicket_shared::NewEvent;

use crate::error::Result;
use crate::metadata::MetadataSource;
use crate::Ticketing;

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// Create a new event on behalf of an organizer.
    pub async fn create_event(&self, event: &NewEvent) -> Result<TxReceipt> {
        event.validate()?;

        if self.contract.signer().is_none() {
            return Err(ChainError::NoSigner.into());
        }

        let receipt = self.contract.create_event(event).await?;
        info!(
            name = %event.name,
            organizer = %event.organizer,
            max_supply = %event.max_supply,
            tx = %receipt.tx_hash,
            "Event created"
        );
        Ok(receipt)
    }
}
