use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid check-in code: {0}")]
    InvalidCheckinCode(String),
}
