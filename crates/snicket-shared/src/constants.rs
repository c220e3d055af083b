/// Application name
pub const APP_NAME: &str = "Snicket";

/// Default JSON-RPC endpoint (Somnia testnet)
pub const DEFAULT_RPC_URL: &str = "https://dream-rpc.somnia.network";

/// Default ticketing contract deployment
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x1D164f8eb94040C63a75C2762e89dc18B0364EFd";

/// Chain id of the Somnia network
pub const SOMNIA_CHAIN_ID: u64 = 50312;

/// Native currency symbol of the Somnia network
pub const NATIVE_SYMBOL: &str = "STT";

/// Decimals of the native currency
pub const NATIVE_DECIMALS: usize = 18;

/// Default IPFS HTTP gateway prefix
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// URI scheme rewritten through the gateway
pub const IPFS_SCHEME: &str = "ipfs://";

/// Upper bound of the event index scan. The contract exposes no event count.
pub const SCAN_MAX: u64 = 100;

/// Number of events shown on the featured list
pub const FEATURED_LIMIT: usize = 3;

/// Fallback ticket artwork
pub const PLACEHOLDER_TICKET_IMAGE: &str = "/event-ticket.png";

/// Fallback ticket event name
pub const UNKNOWN_EVENT_NAME: &str = "Unknown Event";

/// Default public URL embedded in check-in QR codes
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Default base URI prefix for new events
pub const DEFAULT_PRE_BASE_URI: &str = "ipfs://";

/// Default base URI suffix for new events
pub const DEFAULT_POST_BASE_URI: &str = ".json";

/// Default supply for new events
pub const DEFAULT_MAX_SUPPLY: u64 = 100;

/// Length of a `0x`-prefixed hex address
pub const ADDRESS_STR_LEN: usize = 42;
