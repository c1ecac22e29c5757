//! Dashboard refresh: ledger reads to display strings, plus the maturity countdown

use alloy_primitives::{Address, U256};
use chrono::DateTime;
use shared::CONFIG;
use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::address::checksummed;
use crate::constants::{COUNTDOWN_PERIOD, MONEY_DISPLAY_DIGITS, PLACEHOLDER, VOLUME_DISPLAY_DIGITS};
use crate::countdown::{Clock, CountdownDisplay, Scheduler};
use crate::error::Result;
use crate::model::{Rank, Tier};
use crate::units::format_units;
use crate::wallet::LedgerView;

/// Everything the KPI panel shows, already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub account: Address,
    pub tier: &'static str,
    pub rank: &'static str,
    pub claimable_primary: String,
    pub claimable_secondary: String,
    pub volume_left: String,
    pub volume_right: String,
    pub principal: String,
    pub pending_reward: String,
    /// Unix seconds, 0 without a stake
    pub maturity: u64,
    pub stake_end: String,
}

fn money(value: U256) -> String {
    format_units(value, CONFIG.token.decimals, MONEY_DISPLAY_DIGITS)
}

fn volume(value: U256) -> String {
    format_units(value, CONFIG.token.decimals, VOLUME_DISPLAY_DIGITS)
}

/// Maturity as a UTC date, `-` without a stake
pub fn format_stake_end(maturity: u64) -> String {
    if maturity == 0 {
        return PLACEHOLDER.to_string();
    }
    i64::try_from(maturity)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// The single live countdown; dropping it cancels the underlying timer
struct CountdownTimer<H> {
    account: Address,
    maturity: u64,
    /// Set by the final tick
    finished: Rc<Cell<bool>>,
    _handle: H,
}

pub struct DashboardRefresher<L, S: Scheduler, C> {
    ledger: Rc<L>,
    scheduler: S,
    clock: Rc<C>,
    on_countdown: Rc<dyn Fn(&CountdownDisplay)>,
    timer: RefCell<Option<CountdownTimer<S::Handle>>>,
    // A refresh that resumes after a newer one started does not publish
    generation: Cell<u64>,
}

impl<L, S, C> DashboardRefresher<L, S, C>
where
    L: LedgerView,
    S: Scheduler,
    C: Clock + 'static,
{
    pub fn new(ledger: Rc<L>, scheduler: S, clock: Rc<C>, on_countdown: Rc<dyn Fn(&CountdownDisplay)>) -> Self {
        Self {
            ledger,
            scheduler,
            clock,
            on_countdown,
            timer: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Rebuild the snapshot for `account`.
    ///
    /// `Ok(None)` when there is no account or a newer refresh superseded this
    /// one, whether or not its reads failed. The user record is read first; rewards, stake and pending reward
    /// are mandatory, tree volumes degrade to `-` on failure.
    pub async fn refresh(&self, account: Option<Address>) -> Result<Option<DashboardSnapshot>> {
        let Some(account) = account else {
            return Ok(None);
        };
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let user = self.ledger.user_record(account).await;
        if self.superseded(generation, account) {
            return Ok(None);
        }
        let user = user?;

        let (rewards, volumes, stake, pending) = futures::join!(
            self.ledger.claimable_rewards(account),
            self.ledger.tree_volumes(account),
            self.ledger.stake_record(account),
            self.ledger.pending_stake_reward(account),
        );
        if self.superseded(generation, account) {
            return Ok(None);
        }
        let rewards = rewards?;
        let stake = stake?;
        let pending = pending?;

        let (volume_left, volume_right) = match volumes {
            Ok(v) => (volume(v.left), volume(v.right)),
            Err(failure) => {
                warn!(reason = %failure.best_message(), "Tree volumes unavailable");
                (PLACEHOLDER.to_string(), PLACEHOLDER.to_string())
            }
        };

        if stake.maturity > 0 {
            self.start_countdown(account, stake.maturity);
        } else {
            self.stop_countdown();
            (self.on_countdown)(&CountdownDisplay::Inactive);
        }

        Ok(Some(DashboardSnapshot {
            account,
            tier: Tier::label_for_code(user.tier),
            rank: Rank::label_for_code(user.rank),
            claimable_primary: money(rewards.primary),
            claimable_secondary: money(rewards.secondary),
            volume_left,
            volume_right,
            principal: money(stake.principal),
            pending_reward: money(pending),
            maturity: stake.maturity,
            stake_end: format_stake_end(stake.maturity),
        }))
    }

    /// Whether a newer refresh started while this one was awaiting reads;
    /// its results, failures included, are dropped
    fn superseded(&self, generation: u64, account: Address) -> bool {
        let stale = self.generation.get() != generation;
        if stale {
            debug!(account = %checksummed(&account), "Discarding superseded refresh");
        }
        stale
    }

    /// Cancel any running countdown, tick once now, and keep ticking every
    /// second until matured
    pub fn start_countdown(&self, account: Address, maturity: u64) {
        self.stop_countdown();

        let clock = Rc::clone(&self.clock);
        let on_countdown = Rc::clone(&self.on_countdown);
        let finished = Rc::new(Cell::new(false));
        let done = Rc::clone(&finished);
        let mut tick = move || {
            let display = CountdownDisplay::at(maturity, clock.now_secs());
            on_countdown(&display);
            if display.is_final() {
                done.set(true);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };

        if tick().is_break() {
            return;
        }

        let handle = self.scheduler.repeat(COUNTDOWN_PERIOD, Box::new(tick));
        *self.timer.borrow_mut() = Some(CountdownTimer {
            account,
            maturity,
            finished,
            _handle: handle,
        });
    }

    pub fn stop_countdown(&self) {
        if let Some(timer) = self.timer.borrow_mut().take() {
            debug!(account = %checksummed(&timer.account), maturity = timer.maturity, "Countdown cancelled");
        }
    }

    /// Maturity the live countdown is tracking; `None` once it has matured
    pub fn active_countdown(&self) -> Option<u64> {
        self.timer
            .borrow()
            .as_ref()
            .filter(|t| !t.finished.get())
            .map(|t| t.maturity)
    }
}
