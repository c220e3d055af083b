//! Server configuration loaded from environment variables.
//!
//! Every setting has a default, so the server starts against the public
//! Somnia testnet deployment with zero configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use snicket_chain::ContractConfig;
use snicket_shared::constants::{
    DEFAULT_CONTRACT_ADDRESS, DEFAULT_IPFS_GATEWAY, DEFAULT_PUBLIC_URL, DEFAULT_RPC_URL, SCAN_MAX,
};
use snicket_shared::{parse_address, Address};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// JSON-RPC endpoint of the chain node.
    /// Env: `SNICKET_RPC_URL`
    pub rpc_url: String,

    /// Address of the ticketing contract.
    /// Env: `SNICKET_CONTRACT_ADDRESS`
    pub contract_address: Address,

    /// Gateway prefix that `ipfs://` URIs are rewritten to.
    /// Env: `SNICKET_IPFS_GATEWAY`
    pub ipfs_gateway: String,

    /// Number of event indices scanned per discovery scan.
    /// Env: `SNICKET_SCAN_MAX`
    /// Default: `100`
    pub scan_max: u64,

    /// Base URL embedded in check-in links.
    /// Env: `SNICKET_PUBLIC_URL`
    pub public_url: String,

    /// Receipt and log polling interval.
    /// Env: `SNICKET_POLL_INTERVAL_MS`
    /// Default: 2 s
    pub poll_interval: Duration,

    /// How long to wait for a transaction receipt.
    /// Env: `SNICKET_RECEIPT_TIMEOUT_SECS`
    /// Default: 120 s
    pub receipt_timeout: Duration,

    /// Upper bound on one JSON-RPC round trip.
    /// Env: `SNICKET_RPC_TIMEOUT_SECS`
    /// Default: 15 s
    pub rpc_timeout: Duration,

    /// Upper bound on serving one HTTP request, answered with 408.
    /// Env: `SNICKET_REQUEST_TIMEOUT_SECS`
    /// Default: 60 s
    pub request_timeout: Duration,

    /// HTTP requests served at once; further requests wait for a slot.
    /// Env: `SNICKET_MAX_CONCURRENT_REQUESTS`
    /// Default: `32`
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: parse_address(DEFAULT_CONTRACT_ADDRESS).unwrap_or(Address::ZERO),
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            scan_max: SCAN_MAX,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            poll_interval: Duration::from_millis(2_000),
            receipt_timeout: Duration::from_secs(120),
            rpc_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
            max_concurrent_requests: 32,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        parse_into(&lookup, "HTTP_ADDR", &mut config.http_addr);

        if let Some(url) = lookup("SNICKET_RPC_URL").filter(|v| !v.trim().is_empty()) {
            config.rpc_url = url.trim().to_string();
        }

        if let Some(raw) = lookup("SNICKET_CONTRACT_ADDRESS") {
            match parse_address(&raw) {
                Ok(address) => config.contract_address = address,
                Err(_) => tracing::warn!(value = %raw, "Invalid SNICKET_CONTRACT_ADDRESS, using default"),
            }
        }

        if let Some(gateway) = lookup("SNICKET_IPFS_GATEWAY").filter(|v| !v.trim().is_empty()) {
            config.ipfs_gateway = gateway.trim().to_string();
        }

        parse_into(&lookup, "SNICKET_SCAN_MAX", &mut config.scan_max);

        if let Some(url) = lookup("SNICKET_PUBLIC_URL").filter(|v| !v.trim().is_empty()) {
            config.public_url = url.trim().trim_end_matches('/').to_string();
        }

        let mut poll_ms = config.poll_interval.as_millis() as u64;
        parse_into(&lookup, "SNICKET_POLL_INTERVAL_MS", &mut poll_ms);
        if poll_ms == 0 {
            tracing::warn!("SNICKET_POLL_INTERVAL_MS must be positive, using default");
        } else {
            config.poll_interval = Duration::from_millis(poll_ms);
        }

        parse_secs(&lookup, "SNICKET_RECEIPT_TIMEOUT_SECS", &mut config.receipt_timeout);
        parse_secs(&lookup, "SNICKET_RPC_TIMEOUT_SECS", &mut config.rpc_timeout);
        parse_secs(&lookup, "SNICKET_REQUEST_TIMEOUT_SECS", &mut config.request_timeout);

        let mut max_concurrent = config.max_concurrent_requests;
        parse_into(&lookup, "SNICKET_MAX_CONCURRENT_REQUESTS", &mut max_concurrent);
        if max_concurrent == 0 {
            tracing::warn!("SNICKET_MAX_CONCURRENT_REQUESTS must be positive, using default");
        } else {
            config.max_concurrent_requests = max_concurrent;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    pub fn contract_config(&self) -> ContractConfig {
        ContractConfig {
            rpc_url: self.rpc_url.clone(),
            contract_address: self.contract_address,
            poll_interval: self.poll_interval,
            receipt_timeout: self.receipt_timeout,
            request_timeout: self.rpc_timeout,
        }
    }
}

/// Like [`parse_into`] for a whole number of seconds. Zero keeps the default.
fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut Duration) {
    let mut secs = target.as_secs();
    parse_into(lookup, key, &mut secs);
    if secs == 0 {
        tracing::warn!(key, "Timeout must be positive, using default");
    } else {
        *target = Duration::from_secs(secs);
    }
}

/// Overwrite `target` with the parsed value of `key`, keeping the current
/// value (and warning) when it does not parse.
fn parse_into<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "Invalid value, using default"),
    }
}
