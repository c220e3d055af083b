use thiserror::Error;

use snicket_chain::ChainError;
use snicket_shared::validation::RecipientCheck;
use snicket_shared::EventId;

/// Errors produced by the ticketing routines.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Contract call or transaction failure.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The recipient failed local validation; no call was issued.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(RecipientCheck),

    /// The event is inactive or sold out; no call was issued.
    #[error("Event {0} is not available for purchase")]
    EventUnavailable(EventId),

    /// The new event failed local validation; no call was issued.
    #[error("{0}")]
    InvalidEvent(#[from] snicket_shared::SharedError),

    /// Fetching off-chain metadata failed.
    #[error("Metadata fetch failed: {0}")]
    Metadata(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Metadata(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
