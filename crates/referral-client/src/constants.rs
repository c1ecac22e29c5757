//! Centralized constants for the referral client
//!
//! Program-level values that never come from the host page. Chain and token
//! metadata lives in `shared::CONFIG`; contract addresses are host-supplied.

use alloy_primitives::{Address, address};
use std::time::Duration;

// =============================================================================
// Referral Links
// =============================================================================

/// Query parameter carrying the sponsor address
pub const REF_PARAM: &str = "ref";

/// Query parameter carrying the tree side ("L" or "R")
pub const SIDE_PARAM: &str = "side";

/// Sponsor used when a link carries no usable `ref`
pub const COMPANY_SPONSOR: Address = address!("85EFe209769B183d41A332872Ac1cF57bd3d8300");

// =============================================================================
// Addresses
// =============================================================================

/// Marker every account address starts with
pub const ADDRESS_PREFIX: &str = "0x";

/// Hex digits following the prefix
pub const ADDRESS_HEX_LEN: usize = 40;

// =============================================================================
// Package Prices (whole tokens, scaled by the token's decimals at use)
// =============================================================================

pub const SMALL_PRICE_TOKENS: u64 = 100;
pub const MEDIUM_PRICE_TOKENS: u64 = 1_000;
pub const LARGE_PRICE_TOKENS: u64 = 10_000;

// =============================================================================
// Display
// =============================================================================

/// Shown wherever a value is missing or could not be converted
pub const PLACEHOLDER: &str = "-";

/// Fraction digits kept for monetary and reward amounts
pub const MONEY_DISPLAY_DIGITS: usize = 6;

/// Fraction digits kept for tree volumes
pub const VOLUME_DISPLAY_DIGITS: usize = 4;

/// Countdown label once a stake has matured
pub const MATURED_LABEL: &str = "Matured ✅";

/// Countdown tick period
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

// =============================================================================
// Wallet Protocol
// =============================================================================

/// EIP-1193 error code for a request the user declined
pub const USER_REJECTED_CODE: i64 = 4001;
