//! Account address validation and EIP-55 canonical encoding

use alloy_primitives::Address;
use std::str::FromStr;

use crate::constants::{ADDRESS_HEX_LEN, ADDRESS_PREFIX};
use crate::error::{ClientError, Result};

/// True iff `s` is `0x` followed by exactly 40 hex digits (any case)
pub fn is_valid_address(s: &str) -> bool {
    s.len() == ADDRESS_PREFIX.len() + ADDRESS_HEX_LEN
        && s.starts_with(ADDRESS_PREFIX)
        && s[ADDRESS_PREFIX.len()..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a format-valid address. Mixed-case input is accepted regardless of its
/// checksum; only the format check gates.
pub fn canonicalize(s: &str) -> Result<Address> {
    if !is_valid_address(s) {
        return Err(ClientError::Format(s.to_string()));
    }
    Address::from_str(s).map_err(|_| ClientError::Format(s.to_string()))
}

/// EIP-55 mixed-case string for an address
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Canonicalize straight to the display string
pub fn canonical_string(s: &str) -> Result<String> {
    canonicalize(s).map(|a| checksummed(&a))
}
