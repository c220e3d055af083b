use thiserror::Error;

/// Errors produced while talking to the chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The call reverted. Carries the decoded `Error(string)` reason when present.
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// The node could not be reached (connection refused, timeout, 429/5xx).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Return data did not match the expected ABI layout.
    #[error("ABI error: {0}")]
    Abi(String),

    /// A state-changing call was attempted without a signing account.
    #[error("No wallet connected")]
    NoSigner,

    /// The transaction was mined but its receipt reports failure.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No receipt appeared before the configured timeout.
    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),

    /// The node returned something that is not valid for the method.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    /// Short human-readable reason, preferring the revert message.
    pub fn reason(&self) -> String {
        match self {
            ChainError::Reverted(reason) => reason.clone(),
            ChainError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the node itself was unreachable, as opposed to answering badly.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChainError::Transport(_))
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(e: reqwest::Error) -> Self {
        ChainError::Transport(e.to_string())
    }
}

impl From<alloy_sol_types::Error> for ChainError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ChainError::Abi(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChainError>;
