//! In-memory wallet, ledger, timer and clock for exercising the client
//! without a browser

#![allow(dead_code)]

use alloy_primitives::{Address, B256, U256};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;
use url::Url;

use referral_client::address::canonicalize;
use referral_client::wallet::{
    BuyOrder, ClaimableRewards, LedgerActions, LedgerView, ProviderFailure, StakeRecord, TreeVolumes, TxHash,
    UserRecord, WalletEvent, WalletProvider,
};
use referral_client::{Client, Clock, Contracts, CountdownDisplay, DashboardSnapshot, NetworkConfig, Scheduler, UiHooks};

pub const ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const SPONSOR: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const CORE: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
pub const BSC: u64 = 56;
pub const PAGE: &str = "https://app.example.org/";

/// 2026-01-01 00:00:00 UTC
pub const MATURITY: u64 = 1_767_225_600;

pub fn addr(s: &str) -> Address {
    canonicalize(s).unwrap()
}

/// Whole tokens in base units (18 decimals)
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

pub fn contracts() -> Contracts {
    let json = format!(
        r#"{{ "CORE": "{}", "VAULT": "{}", "STAKING": "{}", "USDT": "{}", "BINARY": "{}" }}"#,
        CORE,
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        "0x85EFe209769B183d41A332872Ac1cF57bd3d8300",
        "0x1111111111111111111111111111111111111111",
        "0x2222222222222222222222222222222222222222",
    );
    NetworkConfig::from_json(&json).unwrap().resolve().unwrap()
}

// =============================================================================
// Wallet
// =============================================================================

#[derive(Default)]
pub struct WalletState {
    pub accounts: RefCell<Vec<String>>,
    pub chain_id: Cell<u64>,
    pub switchable: Cell<bool>,
    pub reject_accounts: Cell<bool>,
    pub reject_switch: Cell<bool>,
    pub switch_requests: RefCell<Vec<u64>>,
    pub listeners: RefCell<Vec<Rc<dyn Fn(WalletEvent)>>>,
    /// Chain reads that stay pending until the test answers them
    pub held_chain_reads: RefCell<VecDeque<oneshot::Receiver<u64>>>,
}

#[derive(Clone, Default)]
pub struct FakeWallet(pub Rc<WalletState>);

impl FakeWallet {
    pub fn new(accounts: &[&str], chain_id: u64) -> Self {
        let wallet = Self::default();
        *wallet.0.accounts.borrow_mut() = accounts.iter().map(|a| a.to_string()).collect();
        wallet.0.chain_id.set(chain_id);
        wallet.0.switchable.set(true);
        wallet
    }

    /// Make the next chain read wait for the returned sender
    pub fn hold_next_chain_read(&self) -> oneshot::Sender<u64> {
        let (tx, rx) = oneshot::channel();
        self.0.held_chain_reads.borrow_mut().push_back(rx);
        tx
    }

    pub fn emit(&self, event: WalletEvent) {
        let listeners = self.0.listeners.borrow().clone();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderFailure> {
        if self.0.reject_accounts.get() {
            return Err(ProviderFailure::new("User rejected the request.").with_code(4001));
        }
        Ok(self.0.accounts.borrow().clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderFailure> {
        let held = self.0.held_chain_reads.borrow_mut().pop_front();
        match held {
            Some(rx) => rx.await.map_err(|_| ProviderFailure::new("chain read dropped")),
            None => Ok(self.0.chain_id.get()),
        }
    }

    fn can_switch_network(&self) -> bool {
        self.0.switchable.get()
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), ProviderFailure> {
        self.0.switch_requests.borrow_mut().push(chain_id);
        if self.0.reject_switch.get() {
            return Err(ProviderFailure::new("User rejected the request.").with_code(4001));
        }
        self.0.chain_id.set(chain_id);
        Ok(())
    }

    fn subscribe(&self, listener: Rc<dyn Fn(WalletEvent)>) {
        self.0.listeners.borrow_mut().push(listener);
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Allowance { owner: Address, spender: Address },
    Approve { from: Address, spender: Address, amount: U256 },
    Buy { from: Address, order: BuyOrder },
    ClaimPrimary(Address),
    ClaimStake(Address),
    Wait(TxHash),
}

#[derive(Default)]
pub struct LedgerState {
    pub allowance: Cell<U256>,
    pub user: Cell<UserRecord>,
    pub rewards: Cell<ClaimableRewards>,
    pub volumes: Cell<TreeVolumes>,
    pub stake: Cell<StakeRecord>,
    pub pending: Cell<U256>,
    /// Operation name -> failure it returns
    pub failures: RefCell<HashMap<&'static str, ProviderFailure>>,
    pub calls: RefCell<Vec<Call>>,
    pub reads: Cell<u32>,
    /// Operation name -> reads that stay pending until the test releases them
    pub held_reads: RefCell<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
    next_tx: Cell<u8>,
}

#[derive(Clone, Default)]
pub struct FakeLedger(pub Rc<LedgerState>);

impl FakeLedger {
    pub fn fail(&self, op: &'static str, message: &str) {
        self.fail_with(op, ProviderFailure::new(message));
    }

    pub fn fail_with(&self, op: &'static str, failure: ProviderFailure) {
        self.0.failures.borrow_mut().insert(op, failure);
    }

    pub fn clear_failures(&self) {
        self.0.failures.borrow_mut().clear();
    }

    /// Make the next `op` read wait for the returned sender
    pub fn hold_next_read(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.0.held_reads.borrow_mut().entry(op).or_default().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.calls.borrow().clone()
    }

    pub fn set_maturity(&self, maturity: u64) {
        let mut stake = self.0.stake.get();
        stake.maturity = maturity;
        self.0.stake.set(stake);
    }

    /// Hash the n-th submitted transaction will get (1-based)
    pub fn tx(n: u8) -> TxHash {
        B256::with_last_byte(n)
    }

    fn check(&self, op: &str) -> Result<(), ProviderFailure> {
        match self.0.failures.borrow().get(op) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    async fn read(&self, op: &str) -> Result<(), ProviderFailure> {
        self.0.reads.set(self.0.reads.get() + 1);
        let held = self.0.held_reads.borrow_mut().get_mut(op).and_then(VecDeque::pop_front);
        if let Some(rx) = held {
            rx.await.map_err(|_| ProviderFailure::new("read dropped"))?;
        }
        self.check(op)
    }

    fn submit(&self, op: &str, call: Call) -> Result<TxHash, ProviderFailure> {
        self.0.calls.borrow_mut().push(call);
        self.check(op)?;
        let n = self.0.next_tx.get() + 1;
        self.0.next_tx.set(n);
        Ok(Self::tx(n))
    }
}

impl LedgerView for FakeLedger {
    async fn user_record(&self, _account: Address) -> Result<UserRecord, ProviderFailure> {
        self.read("user").await?;
        Ok(self.0.user.get())
    }

    async fn claimable_rewards(&self, _account: Address) -> Result<ClaimableRewards, ProviderFailure> {
        self.read("rewards").await?;
        Ok(self.0.rewards.get())
    }

    async fn tree_volumes(&self, _account: Address) -> Result<TreeVolumes, ProviderFailure> {
        self.read("volumes").await?;
        Ok(self.0.volumes.get())
    }

    async fn stake_record(&self, _account: Address) -> Result<StakeRecord, ProviderFailure> {
        self.read("stake").await?;
        Ok(self.0.stake.get())
    }

    async fn pending_stake_reward(&self, _account: Address) -> Result<U256, ProviderFailure> {
        self.read("pending").await?;
        Ok(self.0.pending.get())
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ProviderFailure> {
        self.0.calls.borrow_mut().push(Call::Allowance { owner, spender });
        self.check("allowance")?;
        Ok(self.0.allowance.get())
    }
}

impl LedgerActions for FakeLedger {
    async fn approve(&self, from: Address, spender: Address, amount: U256) -> Result<TxHash, ProviderFailure> {
        self.submit("approve", Call::Approve { from, spender, amount })
    }

    async fn buy_or_upgrade(&self, from: Address, order: &BuyOrder) -> Result<TxHash, ProviderFailure> {
        self.submit("buy", Call::Buy { from, order: *order })
    }

    async fn claim_primary_reward(&self, from: Address) -> Result<TxHash, ProviderFailure> {
        self.submit("claim_primary", Call::ClaimPrimary(from))
    }

    async fn claim_stake_reward(&self, from: Address) -> Result<TxHash, ProviderFailure> {
        self.submit("claim_stake", Call::ClaimStake(from))
    }

    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<(), ProviderFailure> {
        self.0.calls.borrow_mut().push(Call::Wait(tx));
        self.check("wait")
    }
}

// =============================================================================
// Timer and clock
// =============================================================================

struct Slot {
    tick: Box<dyn FnMut() -> ControlFlow<()>>,
    cancelled: Rc<Cell<bool>>,
    halted: bool,
}

/// Timers fire only when the test calls [`ManualScheduler::advance`]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slots: Rc<RefCell<Vec<Slot>>>,
}

pub struct ManualHandle(Rc<Cell<bool>>);

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn repeat(&self, _period: Duration, tick: Box<dyn FnMut() -> ControlFlow<()>>) -> ManualHandle {
        let cancelled = Rc::new(Cell::new(false));
        self.slots.borrow_mut().push(Slot {
            tick,
            cancelled: Rc::clone(&cancelled),
            halted: false,
        });
        ManualHandle(cancelled)
    }
}

impl ManualScheduler {
    /// One period elapses; returns how many timers ticked
    pub fn advance(&self) -> usize {
        let mut fired = 0;
        for slot in self.slots.borrow_mut().iter_mut() {
            if slot.halted || slot.cancelled.get() {
                continue;
            }
            fired += 1;
            if (slot.tick)().is_break() {
                slot.halted = true;
            }
        }
        fired
    }

    /// Timers neither cancelled nor halted
    pub fn live(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|s| !s.halted && !s.cancelled.get())
            .count()
    }
}

#[derive(Clone, Default)]
pub struct ManualClock(pub Rc<Cell<u64>>);

impl ManualClock {
    pub fn set(&self, now: u64) {
        self.0.set(now);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.0.get()
    }
}

// =============================================================================
// Page hooks
// =============================================================================

#[derive(Default)]
pub struct Recorder {
    pub statuses: RefCell<Vec<String>>,
    pub countdowns: RefCell<Vec<String>>,
    pub snapshots: RefCell<Vec<DashboardSnapshot>>,
}

impl Recorder {
    pub fn hooks(self: &Rc<Self>) -> UiHooks {
        let status = Rc::clone(self);
        let countdown = Rc::clone(self);
        let snapshot = Rc::clone(self);
        UiHooks {
            status: Rc::new(move |message: &str| status.statuses.borrow_mut().push(message.to_string())),
            countdown: Rc::new(move |display: &CountdownDisplay| {
                countdown.countdowns.borrow_mut().push(display.to_string())
            }),
            snapshot: Rc::new(move |s: &DashboardSnapshot| snapshot.snapshots.borrow_mut().push(s.clone())),
        }
    }

    pub fn last_status(&self) -> String {
        self.statuses.borrow().last().cloned().unwrap_or_default()
    }

    pub fn last_countdown(&self) -> String {
        self.countdowns.borrow().last().cloned().unwrap_or_default()
    }
}

// =============================================================================
// Full client
// =============================================================================

pub type TestClient = Client<FakeWallet, FakeLedger, ManualScheduler, ManualClock>;

pub struct Harness {
    pub client: TestClient,
    pub wallet: FakeWallet,
    pub ledger: FakeLedger,
    pub scheduler: ManualScheduler,
    pub clock: ManualClock,
    pub recorder: Rc<Recorder>,
}

pub fn harness(page: &str) -> Harness {
    harness_with(page, Some(FakeWallet::new(&[&ACCOUNT.to_lowercase()], BSC)))
}

pub fn harness_with(page: &str, wallet: Option<FakeWallet>) -> Harness {
    let ledger = FakeLedger::default();
    let scheduler = ManualScheduler::default();
    let clock = ManualClock::default();
    clock.set(MATURITY - 3_661);
    let recorder = Rc::new(Recorder::default());

    let client = Client::new(
        wallet.clone(),
        ledger.clone(),
        contracts(),
        Url::parse(page).unwrap(),
        scheduler.clone(),
        clock.clone(),
        recorder.hooks(),
    );

    Harness {
        client,
        wallet: wallet.unwrap_or_default(),
        ledger,
        scheduler,
        clock,
        recorder,
    }
}
