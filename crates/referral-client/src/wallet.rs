//! Boundary to the injected wallet and the program's contracts
//!
//! The browser crate implements these traits over an EIP-1193 provider; tests
//! implement them in memory. Futures are not `Send`: everything runs on the
//! page's single event loop.

use alloy_primitives::{Address, B256, U256};
use std::rc::Rc;

use crate::constants::USER_REJECTED_CODE;
use crate::model::{Side, Tier};

/// Hash of a submitted transaction
pub type TxHash = B256;

/// Diagnostic fields a wallet or node may attach to a failed request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFailure {
    pub code: Option<i64>,
    /// `error.message`, set by nodes relaying a revert
    pub nested_message: Option<String>,
    /// `data.message`
    pub data_message: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    /// Stringified failure, always present
    pub raw: String,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            raw: message.clone(),
            message: Some(message),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }

    /// Candidate texts, richest first
    fn candidates(&self) -> [Option<&str>; 5] {
        [
            self.nested_message.as_deref(),
            self.data_message.as_deref(),
            self.reason.as_deref(),
            self.message.as_deref(),
            Some(self.raw.as_str()),
        ]
    }

    /// Human-readable reason for the status line
    pub fn best_message(&self) -> String {
        first_message(&self.candidates())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// First non-blank candidate, in order
pub fn first_message<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Parse an EIP-1193 hex quantity such as `"0x38"`
pub fn parse_quantity(hex: &str) -> Result<u64, ProviderFailure> {
    let digits = hex.trim().trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map_err(|_| ProviderFailure::new(format!("Malformed quantity: {}", hex)))
}

/// Notification pushed by the wallet, not caused by any client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    /// New chain id when the wallet supplied a parseable one
    ChainChanged(Option<u64>),
}

/// Injected wallet capabilities
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Prompt for account access; the first entry is the active account
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderFailure>;

    async fn chain_id(&self) -> Result<u64, ProviderFailure>;

    /// Whether the wallet accepts network-switch requests at all
    fn can_switch_network(&self) -> bool;

    async fn switch_network(&self, chain_id: u64) -> Result<(), ProviderFailure>;

    /// Register for account/network change notifications for the page lifetime
    fn subscribe(&self, listener: Rc<dyn Fn(WalletEvent)>);
}

/// `core.users(account)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub tier: u8,
    pub rank: u8,
}

/// `vault.earns(account)`: stable-token and reward-token balances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimableRewards {
    pub primary: U256,
    pub secondary: U256,
}

/// `binary.volumesOf(account)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeVolumes {
    pub left: U256,
    pub right: U256,
}

/// `staking.stakes(account)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StakeRecord {
    pub principal: U256,
    /// Unix seconds, 0 when there is no stake
    pub maturity: u64,
}

/// Arguments of `core.buyOrUpgrade`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOrder {
    pub tier: Tier,
    pub sponsor: Address,
    pub side: Side,
}

/// Read surface of the program contracts
#[allow(async_fn_in_trait)]
pub trait LedgerView {
    async fn user_record(&self, account: Address) -> Result<UserRecord, ProviderFailure>;

    async fn claimable_rewards(&self, account: Address) -> Result<ClaimableRewards, ProviderFailure>;

    async fn tree_volumes(&self, account: Address) -> Result<TreeVolumes, ProviderFailure>;

    async fn stake_record(&self, account: Address) -> Result<StakeRecord, ProviderFailure>;

    async fn pending_stake_reward(&self, account: Address) -> Result<U256, ProviderFailure>;

    /// Payment-token allowance granted by `owner` to `spender`
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ProviderFailure>;
}

/// Write surface; each call returns once the wallet has broadcast the transaction
#[allow(async_fn_in_trait)]
pub trait LedgerActions {
    async fn approve(&self, from: Address, spender: Address, amount: U256) -> Result<TxHash, ProviderFailure>;

    async fn buy_or_upgrade(&self, from: Address, order: &BuyOrder) -> Result<TxHash, ProviderFailure>;

    async fn claim_primary_reward(&self, from: Address) -> Result<TxHash, ProviderFailure>;

    async fn claim_stake_reward(&self, from: Address) -> Result<TxHash, ProviderFailure>;

    /// Resolve once the transaction is included; fail if it reverted
    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<(), ProviderFailure>;
}
