//! Pay-then-act buy sequence and the two claim actions

use alloy_primitives::{Address, U256, hex};
use shared::CONFIG;
use std::fmt;
use std::rc::Rc;
use tracing::info;

use crate::connection::Session;
use crate::constants::{LARGE_PRICE_TOKENS, MEDIUM_PRICE_TOKENS, SMALL_PRICE_TOKENS};
use crate::error::{ClientError, Result};
use crate::model::Tier;
use crate::selection::Selection;
use crate::units::parse_whole_units;
use crate::wallet::{BuyOrder, LedgerActions, LedgerView, TxHash};

/// Exact payment for a package, in base units of the payment token
pub fn package_price(tier: Tier) -> Result<U256> {
    let tokens = match tier {
        Tier::Small => SMALL_PRICE_TOKENS,
        Tier::Medium => MEDIUM_PRICE_TOKENS,
        Tier::Large => LARGE_PRICE_TOKENS,
        Tier::Unset => return Err(ClientError::InvalidTier(tier.code())),
    };
    parse_whole_units(tokens, CONFIG.token.decimals)
        .ok_or_else(|| ClientError::ExternalCall(format!("Price of {} does not fit in 256 bits", tier.label())))
}

/// User-triggered write actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    ClaimBonus,
    ClaimStake,
}

impl Action {
    /// Status-line prefix when the action fails
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Action::Buy => "Buy failed",
            Action::ClaimBonus => "Claim bonus failed",
            Action::ClaimStake => "Claim stake failed",
        }
    }
}

/// Reward claims; a buy never goes through the claim path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Bonus,
    Stake,
}

impl Claim {
    fn action(self) -> Action {
        match self {
            Claim::Bonus => Action::ClaimBonus,
            Claim::Stake => Action::ClaimStake,
        }
    }
}

/// Step reports, in the order they happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    CheckingAllowance,
    Approving,
    ApprovalSent(TxHash),
    ApprovalConfirmed,
    AllowanceSufficient,
    Submitting(Action),
    Sent(Action, TxHash),
    Succeeded(Action),
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::CheckingAllowance => f.write_str("Checking allowance..."),
            Progress::Approving => write!(f, "Approving {}...", CONFIG.token.symbol),
            Progress::ApprovalSent(tx) => write!(f, "Approve sent: {}", hex::encode_prefixed(tx)),
            Progress::ApprovalConfirmed => f.write_str("Approve confirmed ✅"),
            Progress::AllowanceSufficient => f.write_str("Allowance OK ✅"),
            Progress::Submitting(Action::Buy) => f.write_str("Buying / Upgrading..."),
            Progress::Submitting(Action::ClaimBonus) => f.write_str("Claiming bonus (Vault)..."),
            Progress::Submitting(Action::ClaimStake) => f.write_str("Claiming stake (Staking)..."),
            Progress::Sent(Action::Buy, tx) => write!(f, "Buy sent: {}", hex::encode_prefixed(tx)),
            Progress::Sent(_, tx) => write!(f, "Claim sent: {}", hex::encode_prefixed(tx)),
            Progress::Succeeded(Action::Buy) => f.write_str("Buy/Upgrade success ✅"),
            Progress::Succeeded(Action::ClaimBonus) => f.write_str("Claim Bonus success ✅"),
            Progress::Succeeded(Action::ClaimStake) => f.write_str("Claim Stake success ✅"),
        }
    }
}

/// Runs write actions against the ledger.
///
/// Invocations are not serialized here: the caller disables the triggering
/// control while an action is in flight.
pub struct TransactionOrchestrator<L> {
    ledger: Rc<L>,
    /// Core contract; spends the payment token on the buyer's behalf
    spender: Address,
    chain_id: u64,
}

impl<L: LedgerView + LedgerActions> TransactionOrchestrator<L> {
    pub fn new(ledger: Rc<L>, spender: Address, chain_id: u64) -> Self {
        Self {
            ledger,
            spender,
            chain_id,
        }
    }

    /// Connected account on the target network
    fn actor(&self, session: &Session) -> Result<Address> {
        let account = session
            .account
            .ok_or(ClientError::InvalidSelection("Please connect wallet first."))?;
        if session.chain_id != Some(self.chain_id) {
            return Err(ClientError::WrongNetwork {
                name: CONFIG.network.name,
                expected: self.chain_id,
                actual: session.chain_id,
            });
        }
        Ok(account)
    }

    /// Approve exactly the package price if the allowance is short, then buy.
    /// All preconditions are checked before the first network call; any
    /// failure stops the sequence.
    pub async fn buy(&self, session: &Session, selection: &Selection, report: &dyn Fn(Progress)) -> Result<TxHash> {
        let account = self.actor(session)?;
        let tier = selection
            .tier
            .ok_or(ClientError::InvalidSelection("Please select a package."))?;
        let amount = package_price(tier)?;
        let sponsor = selection
            .sponsor
            .ok_or(ClientError::InvalidSelection("Sponsor is invalid."))?;
        let side = selection
            .side
            .ok_or(ClientError::InvalidSelection("Please choose Left/Right."))?;

        report(Progress::CheckingAllowance);
        let allowance = self.ledger.allowance(account, self.spender).await?;

        if allowance < amount {
            report(Progress::Approving);
            let approval = self.ledger.approve(account, self.spender, amount).await?;
            info!(tx = %hex::encode_prefixed(approval), %amount, "Approval sent");
            report(Progress::ApprovalSent(approval));
            self.ledger.wait_for_confirmation(approval).await?;
            report(Progress::ApprovalConfirmed);
        } else {
            report(Progress::AllowanceSufficient);
        }

        let order = BuyOrder { tier, sponsor, side };
        report(Progress::Submitting(Action::Buy));
        let tx = self.ledger.buy_or_upgrade(account, &order).await?;
        info!(tx = %hex::encode_prefixed(tx), tier = tier.label(), side = side.label(), "Buy sent");
        report(Progress::Sent(Action::Buy, tx));
        self.ledger.wait_for_confirmation(tx).await?;

        report(Progress::Succeeded(Action::Buy));
        Ok(tx)
    }

    /// Claim accrued bonus from the vault
    pub async fn claim_primary_reward(&self, session: &Session, report: &dyn Fn(Progress)) -> Result<TxHash> {
        self.claim(Claim::Bonus, session, report).await
    }

    /// Claim stake principal and reward from staking
    pub async fn claim_stake_reward(&self, session: &Session, report: &dyn Fn(Progress)) -> Result<TxHash> {
        self.claim(Claim::Stake, session, report).await
    }

    async fn claim(&self, claim: Claim, session: &Session, report: &dyn Fn(Progress)) -> Result<TxHash> {
        let account = self.actor(session)?;
        let action = claim.action();

        report(Progress::Submitting(action));
        let tx = match claim {
            Claim::Bonus => self.ledger.claim_primary_reward(account).await?,
            Claim::Stake => self.ledger.claim_stake_reward(account).await?,
        };
        info!(tx = %hex::encode_prefixed(tx), ?action, "Claim sent");
        report(Progress::Sent(action, tx));
        self.ledger.wait_for_confirmation(tx).await?;

        report(Progress::Succeeded(action));
        Ok(tx)
    }
}
