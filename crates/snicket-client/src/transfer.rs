//! Ticket transfer between wallets.

use tracing::{info, warn};

use snicket_chain::{ChainError, TicketContract, TxReceipt};
use snicket_shared::validation::validate_recipient;
use snicket_shared::{Address, Ticket, TokenId};

use crate::error::{ClientError, Result};
use crate::metadata::MetadataSource;
use crate::Ticketing;

/// Result of a mined transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub receipt: TxReceipt,
    pub recipient: Address,
    /// The sender's tickets re-read after the transfer, `None` when that
    /// read failed. The transfer itself has succeeded either way.
    pub tickets: Option<Vec<Ticket>>,
}

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// Transfer `token_id` from `sender` to the address typed in `recipient`.
    ///
    /// The recipient is validated locally first; nothing reaches the
    /// contract unless it is a well-formed address other than `sender`.
    pub async fn transfer_ticket(
        &self,
        sender: Address,
        recipient: &str,
        token_id: TokenId,
    ) -> Result<TransferOutcome> {
        let check = validate_recipient(recipient.trim(), &sender);
        let Some(to) = check.address() else {
            return Err(ClientError::InvalidRecipient(check));
        };

        if self.contract.signer().is_none() {
            return Err(ChainError::NoSigner.into());
        }

        let receipt = self.contract.transfer_from(sender, to, token_id).await?;
        info!(%token_id, from = %sender, %to, tx = %receipt.tx_hash, "Ticket transferred");

        let tickets = match self.list_tickets(sender).await {
            Ok(tickets) => Some(tickets),
            Err(e) => {
                warn!(owner = %sender, error = %e, "Ticket refresh after transfer failed");
                None
            }
        };

        Ok(TransferOutcome {
            receipt,
            recipient: to,
            tickets,
        })
    }
}
