use serde::{Deserialize, Serialize};

pub use alloy_primitives::{Address, B256, U256};

use crate::constants::{
    ADDRESS_STR_LEN, DEFAULT_MAX_SUPPLY, DEFAULT_POST_BASE_URI, DEFAULT_PRE_BASE_URI,
};
use crate::error::SharedError;

/// Contract storage index of an event. Not guaranteed to be stable.
pub type EventId = U256;

/// Contract-assigned ticket token id.
pub type TokenId = U256;

/// Parse a `0x`-prefixed, 40 hex digit address. Checksums are not enforced.
pub fn parse_address(input: &str) -> Result<Address, SharedError> {
    let s = input.trim();
    if s.len() != ADDRESS_STR_LEN || !s.starts_with("0x") {
        return Err(SharedError::InvalidAddress(s.to_string()));
    }
    s.parse::<Address>()
        .map_err(|_| SharedError::InvalidAddress(s.to_string()))
}

/// Clamp a contract word to unix seconds.
pub fn to_seconds(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// uint256 values travel as decimal strings so JSON consumers keep full precision.
pub mod decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An on-chain event as seen by one discovery scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(with = "decimal")]
    pub id: EventId,
    pub name: String,
    /// Unix seconds
    pub start_time: u64,
    /// Unix seconds
    pub end_time: u64,
    #[serde(with = "decimal")]
    pub price_wei: U256,
    #[serde(with = "decimal")]
    pub max_supply: U256,
    #[serde(with = "decimal")]
    pub minted: U256,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Event {
    /// A record is well-formed when it has a name and at least one timestamp.
    pub fn is_well_formed(&self) -> bool {
        !self.name.is_empty() && (self.start_time > 0 || self.end_time > 0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.minted >= self.max_supply
    }

    pub fn available_tickets(&self) -> U256 {
        self.max_supply.saturating_sub(self.minted)
    }

    /// Status relative to `now` (unix seconds).
    pub fn status_at(&self, now: i64) -> EventStatus {
        let now = u64::try_from(now).unwrap_or(0);
        if self.is_sold_out() {
            EventStatus::SoldOut
        } else if now < self.start_time {
            EventStatus::Upcoming
        } else if now > self.end_time {
            EventStatus::Ended
        } else {
            EventStatus::Live
        }
    }

    pub fn status(&self) -> EventStatus {
        self.status_at(chrono::Utc::now().timestamp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    SoldOut,
    Upcoming,
    Live,
    Ended,
}

/// Parameters of an organizer's `createEvent` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    pub start_time: u64,
    pub end_time: u64,
    pub pre_base_uri: String,
    pub post_base_uri: String,
    #[serde(with = "decimal")]
    pub price_wei: U256,
    #[serde(with = "decimal")]
    pub max_supply: U256,
    pub organizer: Address,
}

impl NewEvent {
    /// New event with the default metadata URIs and supply.
    pub fn new(
        name: impl Into<String>,
        start_time: u64,
        end_time: u64,
        price_wei: U256,
        organizer: Address,
    ) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
            pre_base_uri: DEFAULT_PRE_BASE_URI.to_string(),
            post_base_uri: DEFAULT_POST_BASE_URI.to_string(),
            price_wei,
            max_supply: U256::from(DEFAULT_MAX_SUPPLY),
            organizer,
        }
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::InvalidEvent("name is required".into()));
        }
        if self.start_time == 0 {
            return Err(SharedError::InvalidEvent("start time is required".into()));
        }
        if self.end_time < self.start_time {
            return Err(SharedError::InvalidEvent("end time is before start time".into()));
        }
        Ok(())
    }
}

/// A ticket owned by some address, with best-effort display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(with = "decimal")]
    pub token_id: TokenId,
    #[serde(with = "decimal")]
    pub event_id: EventId,
    pub event_name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TicketMetadata>,
    /// Unix seconds, `0` when the event could not be read.
    pub start_time: u64,
}

/// ERC-721 style metadata document. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: U256::ZERO,
            name: "Concert".into(),
            start_time: 1_000,
            end_time: 2_000,
            price_wei: U256::from(10_000_000_000_000_000u64),
            max_supply: U256::from(10),
            minted: U256::from(3),
            active: true,
            image: None,
        }
    }

    #[test]
    fn test_parse_address_accepts_mixed_case() {
        let addr = parse_address("0x1D164f8eb94040C63a75C2762e89dc18B0364EFd").unwrap();
        assert_eq!(
            serde_json::to_value(addr).unwrap(),
            "0x1d164f8eb94040c63a75c2762e89dc18b0364efd"
        );
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        assert!(parse_address("1D164f8eb94040C63a75C2762e89dc18B0364EFd").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xZZ164f8eb94040C63a75C2762e89dc18B0364EFd").is_err());
    }

    #[test]
    fn test_to_seconds_clamps() {
        assert_eq!(to_seconds(U256::from(1_700_000_000u64)), 1_700_000_000);
        assert_eq!(to_seconds(U256::MAX), u64::MAX);
    }

    #[test]
    fn test_event_well_formed() {
        let mut ev = sample_event();
        assert!(ev.is_well_formed());

        ev.name.clear();
        assert!(!ev.is_well_formed());

        let mut ev = sample_event();
        ev.start_time = 0;
        ev.end_time = 0;
        assert!(!ev.is_well_formed());

        ev.end_time = 5;
        assert!(ev.is_well_formed());
    }

    #[test]
    fn test_event_status() {
        let ev = sample_event();
        assert_eq!(ev.status_at(500), EventStatus::Upcoming);
        assert_eq!(ev.status_at(1_500), EventStatus::Live);
        assert_eq!(ev.status_at(2_500), EventStatus::Ended);

        let mut sold = sample_event();
        sold.minted = U256::from(12);
        assert_eq!(sold.status_at(1_500), EventStatus::SoldOut);
        assert_eq!(sold.available_tickets(), U256::ZERO);
    }

    #[test]
    fn test_new_event_validation() {
        let organizer = Address::repeat_byte(7);
        let price = U256::from(1);
        let ev = NewEvent::new("Expo", 100, 200, price, organizer);
        assert!(ev.validate().is_ok());
        assert_eq!(ev.pre_base_uri, "ipfs://");
        assert_eq!(ev.post_base_uri, ".json");
        assert_eq!(ev.max_supply, U256::from(100));

        assert!(NewEvent::new("  ", 100, 200, price, organizer).validate().is_err());
        assert!(NewEvent::new("Expo", 0, 200, price, organizer).validate().is_err());
        assert!(NewEvent::new("Expo", 300, 200, price, organizer).validate().is_err());
    }

    #[test]
    fn test_event_words_serialized_as_decimal_strings() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["id"], "0");
        assert_eq!(json["priceWei"], "10000000000000000");
        assert_eq!(json["maxSupply"], "10");
        assert_eq!(json["startTime"], 1_000);
        assert!(json.get("image").is_none());

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_event());
    }
}
