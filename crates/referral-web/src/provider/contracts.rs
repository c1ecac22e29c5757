//! Program contracts over the wallet's JSON-RPC
//!
//! Reads go through `eth_call`, writes through `eth_sendTransaction` (the
//! wallet signs), confirmations by polling `eth_getTransactionReceipt`.

use alloy_primitives::{Address, U256, hex};
use alloy_sol_types::{SolCall, sol};
use gloo_timers::future::TimeoutFuture;
use referral_client::Contracts;
use referral_client::wallet::{
    BuyOrder, ClaimableRewards, LedgerActions, LedgerView, ProviderFailure, StakeRecord, TreeVolumes, TxHash,
    UserRecord,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::eip1193::InjectedWallet;

/// Delay between receipt polls
const RECEIPT_POLL_MS: u32 = 1_500;

sol! {
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface ICore {
        function users(address account) external view returns (uint8 pkg, uint8 rank);
        function buyOrUpgrade(uint8 pkg, address sponsor, bool sideRight) external;
    }

    interface IVault {
        function earns(address account) external view returns (uint256 claimUSDT, uint256 claimDF);
        function claim() external;
    }

    interface IStaking {
        function stakes(address account) external view returns (uint256 principal, uint256 end);
        function pendingReward(address account) external view returns (uint256);
        function claimStake() external;
    }

    interface IBinary {
        function volumesOf(address account) external view returns (uint256 l, uint256 r);
    }
}

fn buy_call(order: &BuyOrder) -> ICore::buyOrUpgradeCall {
    ICore::buyOrUpgradeCall {
        pkg: order.tier.code(),
        sponsor: order.sponsor,
        sideRight: order.side.is_right(),
    }
}

fn decode_returns<C: SolCall>(result: &str) -> Result<C::Return, ProviderFailure> {
    let bytes = hex::decode(result).map_err(|e| ProviderFailure::new(format!("Malformed eth_call result: {}", e)))?;
    C::abi_decode_returns(&bytes, false)
        .map_err(|e| ProviderFailure::new(format!("Could not decode {} result: {}", C::SIGNATURE, e)))
}

#[derive(Debug, Deserialize)]
struct Receipt {
    status: Option<String>,
}

impl Receipt {
    /// Post-Byzantium receipts carry `0x1` on success, `0x0` on revert
    fn reverted(&self) -> bool {
        self.status.as_deref() == Some("0x0")
    }
}

/// Ledger backed by the injected wallet's RPC connection
pub struct RpcLedger {
    wallet: Option<InjectedWallet>,
    contracts: Contracts,
}

impl RpcLedger {
    pub fn new(wallet: Option<InjectedWallet>, contracts: Contracts) -> Self {
        Self { wallet, contracts }
    }

    fn wallet(&self) -> Result<&InjectedWallet, ProviderFailure> {
        self.wallet
            .as_ref()
            .ok_or_else(|| ProviderFailure::new("No wallet detected"))
    }

    async fn call<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, ProviderFailure> {
        let params = json!([
            { "to": to.to_checksum(None), "data": hex::encode_prefixed(call.abi_encode()) },
            "latest"
        ]);
        let result: String = self.wallet()?.request_json("eth_call", params).await?;
        decode_returns::<C>(&result)
    }

    async fn send<C: SolCall>(&self, from: Address, to: Address, call: C) -> Result<TxHash, ProviderFailure> {
        let params = json!([{
            "from": from.to_checksum(None),
            "to": to.to_checksum(None),
            "data": hex::encode_prefixed(call.abi_encode()),
        }]);
        let hash: String = self.wallet()?.request_json("eth_sendTransaction", params).await?;
        debug!(%hash, function = C::SIGNATURE, "Transaction submitted");
        hash.parse()
            .map_err(|e| ProviderFailure::new(format!("Malformed transaction hash {}: {}", hash, e)))
    }
}

impl LedgerView for RpcLedger {
    async fn user_record(&self, account: Address) -> Result<UserRecord, ProviderFailure> {
        let user = self.call(self.contracts.core, ICore::usersCall { account }).await?;
        Ok(UserRecord {
            tier: user.pkg,
            rank: user.rank,
        })
    }

    async fn claimable_rewards(&self, account: Address) -> Result<ClaimableRewards, ProviderFailure> {
        let earns = self.call(self.contracts.vault, IVault::earnsCall { account }).await?;
        Ok(ClaimableRewards {
            primary: earns.claimUSDT,
            secondary: earns.claimDF,
        })
    }

    async fn tree_volumes(&self, account: Address) -> Result<TreeVolumes, ProviderFailure> {
        let volumes = self.call(self.contracts.binary, IBinary::volumesOfCall { account }).await?;
        Ok(TreeVolumes {
            left: volumes.l,
            right: volumes.r,
        })
    }

    async fn stake_record(&self, account: Address) -> Result<StakeRecord, ProviderFailure> {
        let stake = self.call(self.contracts.staking, IStaking::stakesCall { account }).await?;
        let maturity = u64::try_from(stake.end)
            .map_err(|_| ProviderFailure::new(format!("Stake end out of range: {}", stake.end)))?;
        Ok(StakeRecord {
            principal: stake.principal,
            maturity,
        })
    }

    async fn pending_stake_reward(&self, account: Address) -> Result<U256, ProviderFailure> {
        let pending = self.call(self.contracts.staking, IStaking::pendingRewardCall { account }).await?;
        Ok(pending._0)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ProviderFailure> {
        let allowance = self.call(self.contracts.token, IERC20::allowanceCall { owner, spender }).await?;
        Ok(allowance._0)
    }
}

impl LedgerActions for RpcLedger {
    async fn approve(&self, from: Address, spender: Address, amount: U256) -> Result<TxHash, ProviderFailure> {
        self.send(from, self.contracts.token, IERC20::approveCall { spender, amount }).await
    }

    async fn buy_or_upgrade(&self, from: Address, order: &BuyOrder) -> Result<TxHash, ProviderFailure> {
        self.send(from, self.contracts.core, buy_call(order)).await
    }

    async fn claim_primary_reward(&self, from: Address) -> Result<TxHash, ProviderFailure> {
        self.send(from, self.contracts.vault, IVault::claimCall {}).await
    }

    async fn claim_stake_reward(&self, from: Address) -> Result<TxHash, ProviderFailure> {
        self.send(from, self.contracts.staking, IStaking::claimStakeCall {}).await
    }

    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<(), ProviderFailure> {
        let hash = hex::encode_prefixed(tx);
        loop {
            let receipt: Option<Receipt> = self
                .wallet()?
                .request_json("eth_getTransactionReceipt", json!([hash]))
                .await?;
            match receipt {
                Some(receipt) if receipt.reverted() => {
                    return Err(ProviderFailure::new(format!("Transaction {} reverted", hash)));
                }
                Some(_) => return Ok(()),
                None => TimeoutFuture::new(RECEIPT_POLL_MS).await,
            }
        }
    }
}
