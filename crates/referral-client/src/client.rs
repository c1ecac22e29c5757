//! Application context: owns the session, selection, orchestrator and
//! dashboard, and turns every action's outcome into a status-line message.

use alloy_primitives::Address;
use shared::CONFIG;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use url::Url;

use crate::config::Contracts;
use crate::connection::{ConnectionManager, Session, SessionChange};
use crate::countdown::{Clock, CountdownDisplay, Scheduler};
use crate::dashboard::{DashboardRefresher, DashboardSnapshot};
use crate::error::{ClientError, Result};
use crate::model::{Side, Tier};
use crate::orchestrator::{Action, Progress, TransactionOrchestrator};
use crate::selection::{Selection, SelectionState};
use crate::wallet::{LedgerActions, LedgerView, WalletEvent, WalletProvider};

/// Callbacks into the page
#[derive(Clone)]
pub struct UiHooks {
    /// Single channel for progress, success and failure narration
    pub status: Rc<dyn Fn(&str)>,
    pub countdown: Rc<dyn Fn(&CountdownDisplay)>,
    pub snapshot: Rc<dyn Fn(&DashboardSnapshot)>,
}

pub struct Client<W, L, S: Scheduler, C> {
    connection: ConnectionManager<W>,
    selection: RefCell<SelectionState>,
    orchestrator: TransactionOrchestrator<L>,
    dashboard: DashboardRefresher<L, S, C>,
    contracts: Contracts,
    hooks: UiHooks,
}

impl<W, L, S, C> Client<W, L, S, C>
where
    W: WalletProvider,
    L: LedgerView + LedgerActions,
    S: Scheduler,
    C: Clock + 'static,
{
    pub fn new(
        wallet: Option<W>,
        ledger: L,
        contracts: Contracts,
        page_url: Url,
        scheduler: S,
        clock: C,
        hooks: UiHooks,
    ) -> Self {
        let ledger = Rc::new(ledger);
        Self {
            connection: ConnectionManager::new(wallet, contracts.chain_id, CONFIG.network.name),
            selection: RefCell::new(SelectionState::from_page_url(page_url)),
            orchestrator: TransactionOrchestrator::new(Rc::clone(&ledger), contracts.core, contracts.chain_id),
            dashboard: DashboardRefresher::new(ledger, scheduler, Rc::new(clock), Rc::clone(&hooks.countdown)),
            contracts,
            hooks,
        }
    }

    fn status(&self, message: &str) {
        (self.hooks.status)(message);
    }

    // =========================================================================
    // Read-only accessors
    // =========================================================================

    pub fn session(&self) -> Session {
        self.connection.session()
    }

    pub fn account(&self) -> Option<Address> {
        self.connection.account()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.account().is_some()
    }

    pub fn has_wallet(&self) -> bool {
        self.connection.has_wallet()
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    pub fn selection(&self) -> Selection {
        self.selection.borrow().selection().clone()
    }

    /// Drives the enabled state of the buy control
    pub fn can_submit(&self) -> bool {
        self.selection.borrow().can_submit(self.connection.account())
    }

    pub fn preview_link(&self) -> String {
        self.selection.borrow().preview_link()
    }

    pub fn share_link(&self, side: Side) -> String {
        self.selection.borrow().share_link(side)
    }

    pub fn company_link(&self, side: Side) -> String {
        self.selection.borrow().company_link(side)
    }

    pub fn active_countdown(&self) -> Option<u64> {
        self.dashboard.active_countdown()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Package button pressed ("S", "M", "L"); anything else clears the tier
    pub fn choose_package(&self, button: &str) -> Option<Tier> {
        let tier = Tier::from_button(button);
        self.selection.borrow_mut().set_tier(tier);
        match tier {
            Some(tier) => self.status(&format!("Selected package: {}", tier.label())),
            None => self.status("Please select a package."),
        }
        tier
    }

    pub fn choose_side(&self, side: Side) {
        self.selection.borrow_mut().set_side(side);
        self.status(&format!("Selected side: {}", side.label()));
    }

    /// Sponsor input edited; invalid text clears the sponsor
    pub fn enter_sponsor(&self, raw: &str) -> Option<Address> {
        self.selection.borrow_mut().set_sponsor(raw)
    }

    // =========================================================================
    // Actions (errors end here, as status messages)
    // =========================================================================

    pub async fn connect(&self) -> Result<Address> {
        match self.connection.connect().await {
            Ok(account) => {
                self.status("Connected ✅");
                // A failed first refresh is reported but does not undo the connection
                let _ = self.refresh().await;
                Ok(account)
            }
            Err(e) => {
                self.status(&format!("Connect failed: {}", e));
                Err(e)
            }
        }
    }

    /// Register for wallet notifications; `listener` should schedule
    /// [`Client::handle_wallet_event`] on the page's task queue
    pub fn subscribe(&self, listener: Rc<dyn Fn(WalletEvent)>) {
        self.connection.subscribe(listener);
    }

    pub async fn handle_wallet_event(&self, event: WalletEvent) -> Result<()> {
        if matches!(event, WalletEvent::ChainChanged(_)) && self.is_connected() {
            self.status("Network changed. Refreshing...");
        }

        match self.connection.handle_event(event).await {
            Ok(SessionChange::AccountChanged(_)) => {
                self.status("Account changed ✅");
                self.refresh().await
            }
            Ok(SessionChange::NetworkChanged(_)) => self.refresh().await,
            Ok(SessionChange::Ignored) => Ok(()),
            Err(e) => {
                self.status(&format!("Refresh error: {}", e));
                Err(e)
            }
        }
    }

    pub async fn buy(&self) -> Result<()> {
        let session = self.connection.session();
        let selection = self.selection();
        let report = |progress: Progress| self.status(&progress.to_string());

        let result = self.orchestrator.buy(&session, &selection, &report).await;
        self.finish(Action::Buy, result.map(|_| ())).await
    }

    pub async fn claim_primary_reward(&self) -> Result<()> {
        let session = self.connection.session();
        let report = |progress: Progress| self.status(&progress.to_string());

        let result = self.orchestrator.claim_primary_reward(&session, &report).await;
        self.finish(Action::ClaimBonus, result.map(|_| ())).await
    }

    pub async fn claim_stake_reward(&self) -> Result<()> {
        let session = self.connection.session();
        let report = |progress: Progress| self.status(&progress.to_string());

        let result = self.orchestrator.claim_stake_reward(&session, &report).await;
        self.finish(Action::ClaimStake, result.map(|_| ())).await
    }

    /// Refresh on success, narrate the failure otherwise
    async fn finish(&self, action: Action, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!(?action, error = %e, "Action failed");
                match &e {
                    ClientError::InvalidSelection(message) => self.status(message),
                    _ => self.status(&format!("{}: {}", action.failure_prefix(), e)),
                }
                Err(e)
            }
        }
    }

    /// Reload the dashboard; a no-op while disconnected
    pub async fn refresh(&self) -> Result<()> {
        match self.dashboard.refresh(self.connection.account()).await {
            Ok(Some(snapshot)) => {
                (self.hooks.snapshot)(&snapshot);
                self.status("Refreshed ✅");
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.status(&format!("Refresh error: {}", e));
                Err(e)
            }
        }
    }
}
