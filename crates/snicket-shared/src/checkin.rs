//! Check-in codes carried by ticket QR codes.
//!
//! Two payload shapes are accepted when scanning:
//! - the link form `{base}/checkin?tokenId=7&eventId=1`, as rendered on a ticket
//! - the compact form `ticket:7:1`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedError;
use crate::types::{decimal, EventId, TokenId};

const COMPACT_PREFIX: &str = "ticket:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinCode {
    #[serde(with = "decimal")]
    pub token_id: TokenId,
    #[serde(with = "decimal")]
    pub event_id: EventId,
}

impl CheckinCode {
    pub fn new(token_id: TokenId, event_id: EventId) -> Self {
        Self { token_id, event_id }
    }

    /// Link embedded in the ticket QR code.
    pub fn to_link(&self, public_base_url: &str) -> String {
        format!(
            "{}/checkin?tokenId={}&eventId={}",
            public_base_url.trim_end_matches('/'),
            self.token_id,
            self.event_id
        )
    }

    pub fn to_compact(&self) -> String {
        format!("{COMPACT_PREFIX}{}:{}", self.token_id, self.event_id)
    }

    fn parse_compact(rest: &str, original: &str) -> Result<Self, SharedError> {
        let invalid = || SharedError::InvalidCheckinCode(original.to_string());
        let mut parts = rest.split(':');
        let token_id = parts.next().and_then(|p| p.trim().parse().ok()).ok_or_else(invalid)?;
        let event_id = parts.next().and_then(|p| p.trim().parse().ok()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { token_id, event_id })
    }

    fn parse_link(link: &str) -> Result<Self, SharedError> {
        let invalid = || SharedError::InvalidCheckinCode(link.to_string());
        let (_, query) = link.split_once('?').ok_or_else(invalid)?;
        let query = query.split('#').next().unwrap_or_default();

        let mut token_id = None;
        let mut event_id = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("tokenId", v)) => token_id = v.parse().ok(),
                Some(("eventId", v)) => event_id = v.parse().ok(),
                _ => {}
            }
        }

        match (token_id, event_id) {
            (Some(token_id), Some(event_id)) => Ok(Self { token_id, event_id }),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for CheckinCode {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix(COMPACT_PREFIX) {
            Some(rest) => Self::parse_compact(rest, s),
            None => Self::parse_link(s),
        }
    }
}

impl fmt::Display for CheckinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(token_id: u64, event_id: u64) -> CheckinCode {
        CheckinCode::new(TokenId::from(token_id), EventId::from(event_id))
    }

    #[test]
    fn test_compact_code() {
        let parsed: CheckinCode = "ticket:7:1".parse().unwrap();
        assert_eq!(parsed, code(7, 1));
        assert_eq!(parsed.to_string(), "ticket:7:1");
    }

    #[test]
    fn test_link_code() {
        let link = code(3, 2).to_link("http://localhost:3000/");
        assert_eq!(link, "http://localhost:3000/checkin?tokenId=3&eventId=2");
        assert_eq!(link.parse::<CheckinCode>().unwrap(), code(3, 2));
    }

    #[test]
    fn test_link_param_order_does_not_matter() {
        let parsed: CheckinCode = "/checkin?eventId=4&tokenId=9".parse().unwrap();
        assert_eq!(parsed, code(9, 4));
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert!("ticket:7".parse::<CheckinCode>().is_err());
        assert!("ticket:a:b".parse::<CheckinCode>().is_err());
        assert!("ticket:1:2:3".parse::<CheckinCode>().is_err());
        assert!("/checkin?tokenId=1".parse::<CheckinCode>().is_err());
        assert!("hello".parse::<CheckinCode>().is_err());
    }

    #[test]
    fn test_code_serializes_ids_as_strings() {
        let json = serde_json::to_value(code(7, 1)).unwrap();
        assert_eq!(json, serde_json::json!({ "tokenId": "7", "eventId": "1" }));
    }
}
