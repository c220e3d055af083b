//! JSON-RPC 2.0 transport over HTTP.
//!
//! One request per call, no batching and no retries. Every request is bounded
//! by the client timeout. The node's error objects are mapped onto
//! [`ChainError`], decoding `Error(string)` revert payloads into a readable
//! reason when the node includes them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::{Revert, SolError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ChainError, Result};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Bytes>,
}

impl RpcErrorObject {
    fn into_error(self) -> ChainError {
        let revert = self
            .data
            .as_ref()
            .and_then(|data| Revert::abi_decode(data, true).ok())
            .map(|revert| revert.reason);

        match revert {
            Some(reason) => ChainError::Reverted(reason),
            None if self.message.contains("revert") => ChainError::Reverted(self.message),
            None => ChainError::Rpc {
                code: self.code,
                message: self.message,
            },
        }
    }
}

/// Transaction fields for `eth_sendTransaction`.
#[derive(Debug, Clone, Serialize)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

/// Subset of `eth_getTransactionReceipt` we rely on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
}

impl RawReceipt {
    /// Post-Byzantium status flag. Receipts without one count as success.
    pub fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }
}

/// Subset of an `eth_getLogs` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

/// HTTP JSON-RPC client bound to a single endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Client whose every request gives up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, url))
    }

    pub fn with_http(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one request and deserialize its `result`.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "JSON-RPC request");

        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(err.into_error());
        }

        let value = response.result.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| ChainError::InvalidResponse(format!("{method}: {e}")))
    }

    /// `eth_call` against the latest block, returning raw return data.
    pub async fn call(&self, to: &Address, data: Bytes) -> Result<Bytes> {
        let params = json!([{ "to": to, "data": data }, "latest"]);
        self.request("eth_call", params).await
    }

    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    pub async fn block_number(&self) -> Result<u64> {
        let head: U64 = self.request("eth_blockNumber", json!([])).await?;
        Ok(head.to::<u64>())
    }

    /// Submit a transaction for the node-side account to sign. Returns the hash.
    pub async fn send_transaction(&self, tx: &TxRequest) -> Result<B256> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    pub async fn transaction_receipt(&self, hash: &B256) -> Result<Option<RawReceipt>> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    pub async fn logs(
        &self,
        address: &Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>> {
        let filter = json!({
            "address": address,
            "topics": [topic0],
            "fromBlock": U64::from(from_block),
            "toBlock": U64::from(to_block),
        });
        self.request("eth_getLogs", json!([filter])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_object_with_revert_data() {
        let payload = Revert {
            reason: "Sold out".into(),
        }
        .abi_encode();
        let obj = RpcErrorObject {
            code: 3,
            message: "execution reverted".into(),
            data: Some(Bytes::from(payload)),
        };
        match obj.into_error() {
            ChainError::Reverted(reason) => assert_eq!(reason, "Sold out"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_object_plain() {
        let obj = RpcErrorObject {
            code: -32601,
            message: "method not found".into(),
            data: None,
        };
        assert!(matches!(obj.into_error(), ChainError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn test_error_object_from_node_json() {
        let json = json!({
            "code": 3,
            "message": "execution reverted: Event inactive",
            "data": "0x"
        });
        let obj: RpcErrorObject = serde_json::from_value(json).unwrap();
        assert!(matches!(obj.into_error(), ChainError::Reverted(_)));
    }

    #[test]
    fn test_tx_request_serialization() {
        let tx = TxRequest {
            from: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            data: Bytes::from_static(&[0x12, 0x34]),
            value: Some(U256::from(255)),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["from"], format!("0x{}", "01".repeat(20)));
        assert_eq!(json["data"], "0x1234");
        assert_eq!(json["value"], "0xff");

        let json = serde_json::to_value(TxRequest { value: None, ..tx }).unwrap();
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_receipt_status() {
        let receipt: RawReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x1a",
            "status": "0x0"
        }))
        .unwrap();
        assert!(!receipt.succeeded());
        assert_eq!(receipt.block_number.map(|n| n.to::<u64>()), Some(26));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let rpc = RpcClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = rpc.block_number().await.unwrap_err();
        assert!(err.is_transport());
    }
}
