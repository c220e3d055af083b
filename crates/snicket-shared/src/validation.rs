//! Local recipient checks run before any transfer call is issued.

use std::fmt;

use serde::Serialize;

use crate::constants::ADDRESS_STR_LEN;
use crate::types::{parse_address, Address};

/// Outcome of checking a recipient address typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecipientCheck {
    Empty,
    Incomplete { missing: usize },
    InvalidFormat,
    SelfTransfer,
    Valid { address: Address },
}

impl RecipientCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, RecipientCheck::Valid { .. })
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            RecipientCheck::Valid { address } => Some(*address),
            _ => None,
        }
    }
}

impl fmt::Display for RecipientCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientCheck::Empty => write!(f, "Recipient address is required"),
            RecipientCheck::Incomplete { missing } => {
                write!(f, "{missing} more characters needed")
            }
            RecipientCheck::InvalidFormat => write!(f, "Invalid format"),
            RecipientCheck::SelfTransfer => write!(f, "Cannot transfer to yourself"),
            RecipientCheck::Valid { .. } => write!(f, "Valid wallet"),
        }
    }
}

/// `^0x[a-fA-F0-9]{40}$`
pub fn is_hex_address(input: &str) -> bool {
    input.len() == ADDRESS_STR_LEN
        && input.starts_with("0x")
        && input[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check `input` as a transfer recipient for `sender`.
pub fn validate_recipient(input: &str, sender: &Address) -> RecipientCheck {
    if input.is_empty() {
        return RecipientCheck::Empty;
    }
    if input.len() < ADDRESS_STR_LEN {
        return RecipientCheck::Incomplete {
            missing: ADDRESS_STR_LEN - input.len(),
        };
    }
    if !is_hex_address(input) {
        return RecipientCheck::InvalidFormat;
    }
    match parse_address(input) {
        Ok(address) if address == *sender => RecipientCheck::SelfTransfer,
        Ok(address) => RecipientCheck::Valid { address },
        Err(_) => RecipientCheck::InvalidFormat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "0x1d164f8eb94040c63a75c2762e89dc18b0364efd";

    fn sender() -> Address {
        parse_address(SENDER).unwrap()
    }

    #[test]
    fn test_empty_and_incomplete() {
        assert_eq!(validate_recipient("", &sender()), RecipientCheck::Empty);
        assert_eq!(
            validate_recipient("0x1234", &sender()),
            RecipientCheck::Incomplete { missing: 36 }
        );
    }

    #[test]
    fn test_invalid_format() {
        let bad = format!("0x{}", "g".repeat(40));
        assert_eq!(validate_recipient(&bad, &sender()), RecipientCheck::InvalidFormat);

        let uppercase_prefix = format!("0X{}", "a".repeat(40));
        assert_eq!(
            validate_recipient(&uppercase_prefix, &sender()),
            RecipientCheck::InvalidFormat
        );

        let too_long = format!("0x{}", "a".repeat(41));
        assert_eq!(validate_recipient(&too_long, &sender()), RecipientCheck::InvalidFormat);
    }

    #[test]
    fn test_self_transfer_is_case_insensitive() {
        let upper = format!("0x{}", SENDER[2..].to_uppercase());
        assert_eq!(validate_recipient(&upper, &sender()), RecipientCheck::SelfTransfer);
        assert_eq!(validate_recipient(SENDER, &sender()), RecipientCheck::SelfTransfer);
    }

    #[test]
    fn test_valid_recipient() {
        let other = format!("0x{}", "Ab".repeat(20));
        let check = validate_recipient(&other, &sender());
        assert!(check.is_valid());
        assert_eq!(check.address(), Some(Address::repeat_byte(0xab)));
    }
}
