//! Decimal ether strings to and from wei, on top of alloy's unit helpers.

use alloy_primitives::utils;
use alloy_primitives::U256;

use crate::constants::NATIVE_DECIMALS;
use crate::error::SharedError;

/// Parse a decimal amount such as `"0.01"` into wei.
///
/// Stricter than [`utils::parse_ether`]: signs, exponents and digits past
/// the 18th decimal are rejected instead of being accepted or truncated.
pub fn parse_ether(input: &str) -> Result<U256, SharedError> {
    let s = input.trim();
    let invalid = || SharedError::InvalidAmount(input.to_string());

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > NATIVE_DECIMALS {
        return Err(invalid());
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let frac = if frac.is_empty() { "0" } else { frac };
    utils::parse_ether(&format!("{whole}.{frac}")).map_err(|_| SharedError::AmountOverflow)
}

/// Format wei as a decimal ether string, always keeping one fractional digit.
pub fn format_ether(wei: U256) -> String {
    let full = utils::format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => format!("{full}.0"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1").unwrap(), ether(1));
        assert_eq!(parse_ether("0.01").unwrap(), ether(1) / U256::from(100));
        assert_eq!(parse_ether(".5").unwrap(), ether(1) / U256::from(2));
        assert_eq!(parse_ether("2.").unwrap(), ether(2));
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), U256::from(1));
    }

    #[test]
    fn test_parse_ether_rejects_garbage() {
        assert!(parse_ether("").is_err());
        assert!(parse_ether(".").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("1e18").is_err());
        assert!(parse_ether("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(ether(1)), "1.0");
        assert_eq!(format_ether(ether(1) / U256::from(100)), "0.01");
        assert_eq!(format_ether(ether(1) + ether(1) / U256::from(4)), "1.25");
        assert_eq!(format_ether(U256::from(1)), "0.000000000000000001");
    }
}
