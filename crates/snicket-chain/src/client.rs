//! JSON-RPC implementation of [`TicketContract`].
//!
//! The handle is read-write when the node exposes an unlocked account through
//! `eth_accounts` (the wallet case) and read-only otherwise. Reads are always
//! available; writes without a signer fail with [`ChainError::NoSigner`].

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{B256, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn};

use snicket_shared::{Address, EventId, NewEvent, TokenId};

use crate::contract::{EventRecord, TicketContract, TxReceipt};
use crate::error::{ChainError, Result};
use crate::interface::ISnicket;
use crate::rpc::{RpcClient, TxRequest};

/// Connection settings for the contract client.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    /// Interval between receipt polls.
    pub poll_interval: Duration,
    /// Give up waiting for a receipt after this long.
    pub receipt_timeout: Duration,
    /// Upper bound on a single JSON-RPC round trip.
    pub request_timeout: Duration,
}

impl ContractConfig {
    pub fn rpc_client(&self) -> Result<RpcClient> {
        RpcClient::new(self.rpc_url.clone(), self.request_timeout)
    }
}

/// Contract handle backed by a JSON-RPC node.
#[derive(Clone)]
pub struct RpcContract {
    rpc: Arc<RpcClient>,
    address: Address,
    signer: Option<Address>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RpcContract {
    /// Connect, preferring a signing account when the node offers one.
    pub async fn connect(config: &ContractConfig) -> Result<Self> {
        let rpc = Arc::new(config.rpc_client()?);

        let signer = match rpc.accounts().await {
            Ok(accounts) => accounts.into_iter().next(),
            Err(e) => {
                debug!(error = %e, "eth_accounts unavailable, using read-only access");
                None
            }
        };

        match signer {
            Some(account) => info!(%account, contract = %config.contract_address, "Contract ready (read-write)"),
            None => info!(contract = %config.contract_address, "Contract ready (read-only)"),
        }

        Ok(Self::with_signer(rpc, config, signer))
    }

    /// Read-only handle that never issues `eth_accounts`.
    pub fn read_only(config: &ContractConfig) -> Result<Self> {
        let rpc = Arc::new(config.rpc_client()?);
        Ok(Self::with_signer(rpc, config, None))
    }

    pub fn with_signer(rpc: Arc<RpcClient>, config: &ContractConfig, signer: Option<Address>) -> Self {
        Self {
            rpc,
            address: config.contract_address,
            signer,
            poll_interval: config.poll_interval,
            receipt_timeout: config.receipt_timeout,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn rpc(&self) -> Arc<RpcClient> {
        self.rpc.clone()
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let ret = self.rpc.call(&self.address, call.abi_encode().into()).await?;
        if ret.is_empty() {
            return Err(ChainError::Reverted("empty return data".into()));
        }
        Ok(C::abi_decode_returns(&ret, true)?)
    }

    async fn send<C: SolCall>(&self, call: C, value_wei: U256) -> Result<TxReceipt> {
        let from = self.signer.ok_or(ChainError::NoSigner)?;
        let tx = TxRequest {
            from,
            to: self.address,
            data: call.abi_encode().into(),
            value: (!value_wei.is_zero()).then_some(value_wei),
        };

        let hash = self.rpc.send_transaction(&tx).await?;
        info!(tx = %hash, "Transaction submitted");
        self.wait_for_receipt(hash).await
    }

    /// Poll until the transaction is included, then check its status.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt> {
        let poll = async {
            loop {
                if let Some(receipt) = self.rpc.transaction_receipt(&hash).await? {
                    return Ok::<_, ChainError>(receipt);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(self.receipt_timeout, poll)
            .await
            .map_err(|_| ChainError::ReceiptTimeout(hash.to_string()))??;

        if !receipt.succeeded() {
            warn!(tx = %hash, "Transaction reverted");
            return Err(ChainError::TransactionFailed(receipt.transaction_hash.to_string()));
        }

        let block_number = receipt.block_number.map(|n| n.to::<u64>());
        info!(tx = %hash, block = ?block_number, "Transaction confirmed");
        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number,
        })
    }
}

impl TicketContract for RpcContract {
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn event(&self, index: EventId) -> Result<EventRecord> {
        let ret = self.call(ISnicket::eventsCall { index }).await?;
        Ok(ret.into())
    }

    async fn token_event(&self, token_id: TokenId) -> Result<EventId> {
        Ok(self.call(ISnicket::tokenEventCall { tokenId: token_id }).await?._0)
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<String> {
        Ok(self.call(ISnicket::tokenURICall { tokenId: token_id }).await?._0)
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        Ok(self.call(ISnicket::ownerOfCall { tokenId: token_id }).await?._0)
    }

    async fn tickets_of(&self, owner: Address) -> Result<Vec<TokenId>> {
        Ok(self.call(ISnicket::getMyTicketsCall { owner }).await?._0)
    }

    async fn buy_ticket(&self, event_id: EventId, value_wei: U256) -> Result<TxReceipt> {
        self.send(ISnicket::buyTicketCall { eventId: event_id }, value_wei)
            .await
    }

    async fn transfer_from(&self, from: Address, to: Address, token_id: TokenId) -> Result<TxReceipt> {
        let call = ISnicket::transferFromCall {
            from,
            to,
            tokenId: token_id,
        };
        self.send(call, U256::ZERO).await
    }

    async fn create_event(&self, event: &NewEvent) -> Result<TxReceipt> {
        let call = ISnicket::createEventCall {
            name: event.name.clone(),
            startTime: U256::from(event.start_time),
            endTime: U256::from(event.end_time),
            preBaseURI: event.pre_base_uri.clone(),
            postBaseURI: event.post_base_uri.clone(),
            priceWei: event.price_wei,
            maxSupply: event.max_supply,
            organizer: event.organizer,
        };
        self.send(call, U256::ZERO).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContractConfig {
        ContractConfig {
            rpc_url: "http://127.0.0.1:1".into(),
            contract_address: Address::repeat_byte(0xaa),
            poll_interval: Duration::from_millis(10),
            receipt_timeout: Duration::from_millis(50),
            request_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_read_only_handle_refuses_writes() {
        let contract = RpcContract::read_only(&config()).unwrap();
        assert_eq!(contract.signer(), None);

        let err = contract.buy_ticket(U256::ZERO, U256::from(1)).await.unwrap_err();
        assert!(matches!(err, ChainError::NoSigner));

        let err = contract
            .transfer_from(Address::repeat_byte(1), Address::repeat_byte(2), U256::from(3))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::NoSigner));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let contract = RpcContract::read_only(&config()).unwrap();
        let err = contract.owner_of(U256::from(1)).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_request_timeout_applies_to_calls() {
        // Accepts the connection but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ContractConfig {
            rpc_url: format!("http://{addr}"),
            request_timeout: Duration::from_millis(100),
            ..config()
        };
        let contract = RpcContract::read_only(&config).unwrap();

        let started = std::time::Instant::now();
        let err = contract.token_uri(U256::from(1)).await.unwrap_err();
        assert!(err.is_transport());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
