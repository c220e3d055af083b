//! Domain types and pure helpers shared by every Snicket crate.

pub mod checkin;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod types;
pub mod units;
pub mod validation;

pub use error::SharedError;
pub use types::{
    parse_address, Address, Event, EventId, EventStatus, NewEvent, Ticket, TicketMetadata, TokenId,
    U256,
};
