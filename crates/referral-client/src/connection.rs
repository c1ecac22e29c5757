//! Wallet session: detection, account access, target network, change notifications

use alloy_primitives::Address;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::address::{canonicalize, checksummed};
use crate::error::{ClientError, Result};
use crate::wallet::{WalletEvent, WalletProvider};

/// Authenticated actor as last reported by the wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What a wallet notification did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    AccountChanged(Address),
    NetworkChanged(u64),
    /// Not connected, empty account list, or superseded by a later notification
    Ignored,
}

pub struct ConnectionManager<W> {
    wallet: Option<Rc<W>>,
    expected_chain: u64,
    network_name: &'static str,
    state: Cell<ConnectionState>,
    session: Cell<Session>,
    // Bumped per network notification; a read that resumes under a newer
    // generation is discarded
    network_generation: Cell<u64>,
}

impl<W: WalletProvider> ConnectionManager<W> {
    /// `wallet` is the detected provider, `None` when the page has none
    pub fn new(wallet: Option<W>, expected_chain: u64, network_name: &'static str) -> Self {
        Self {
            wallet: wallet.map(Rc::new),
            expected_chain,
            network_name,
            state: Cell::new(ConnectionState::Disconnected),
            session: Cell::new(Session::default()),
            network_generation: Cell::new(0),
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn session(&self) -> Session {
        self.session.get()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.get().account
    }

    pub fn expected_chain(&self) -> u64 {
        self.expected_chain
    }

    fn wallet(&self) -> Result<Rc<W>> {
        self.wallet.clone().ok_or(ClientError::NoWallet)
    }

    /// Request account access, enforce the target network and become Connected.
    /// On failure the previous state is restored.
    pub async fn connect(&self) -> Result<Address> {
        let wallet = self.wallet()?;
        let previous = self.state.replace(ConnectionState::Connecting);

        match self.establish(&wallet).await {
            Ok((account, chain_id)) => {
                self.session.set(Session {
                    account: Some(account),
                    chain_id: Some(chain_id),
                });
                self.state.set(ConnectionState::Connected);
                info!(account = %checksummed(&account), chain_id, "Wallet connected");
                Ok(account)
            }
            Err(e) => {
                warn!(error = %e, "Wallet connection failed");
                self.state.set(previous);
                Err(e)
            }
        }
    }

    async fn establish(&self, wallet: &W) -> Result<(Address, u64)> {
        let accounts = wallet.request_accounts().await?;
        let first = accounts
            .first()
            .ok_or_else(|| ClientError::ExternalCall("Wallet returned no accounts".to_string()))?;
        let account = canonicalize(first)?;
        let chain_id = self.ensure_network_on(wallet).await?;
        Ok((account, chain_id))
    }

    /// Make sure the wallet is on the target network, asking it to switch if not
    pub async fn ensure_network(&self) -> Result<u64> {
        let wallet = self.wallet()?;
        let chain_id = self.ensure_network_on(&wallet).await?;
        self.set_chain(chain_id);
        Ok(chain_id)
    }

    async fn ensure_network_on(&self, wallet: &W) -> Result<u64> {
        let current = wallet.chain_id().await?;
        if current == self.expected_chain {
            return Ok(current);
        }

        if !wallet.can_switch_network() {
            return Err(self.wrong_network(Some(current)));
        }

        info!(from = current, to = self.expected_chain, "Requesting network switch");
        match wallet.switch_network(self.expected_chain).await {
            Ok(()) => Ok(self.expected_chain),
            Err(failure) => {
                warn!(reason = %failure.best_message(), "Network switch declined");
                Err(self.wrong_network(Some(current)))
            }
        }
    }

    fn wrong_network(&self, actual: Option<u64>) -> ClientError {
        ClientError::WrongNetwork {
            name: self.network_name,
            expected: self.expected_chain,
            actual,
        }
    }

    fn set_chain(&self, chain_id: u64) {
        let mut session = self.session.get();
        session.chain_id = Some(chain_id);
        self.session.set(session);
    }

    /// Forward wallet notifications to `listener` (typically a closure that
    /// schedules [`ConnectionManager::handle_event`])
    pub fn subscribe(&self, listener: Rc<dyn Fn(WalletEvent)>) {
        if let Some(wallet) = &self.wallet {
            wallet.subscribe(listener);
        }
    }

    /// Apply a wallet notification. Safe to call again while a previous call is
    /// still suspended: state is derived fresh from the event or the wallet, and
    /// a superseded network read does not overwrite a newer one.
    pub async fn handle_event(&self, event: WalletEvent) -> Result<SessionChange> {
        if self.state.get() != ConnectionState::Connected {
            debug!(?event, "Ignoring wallet event while not connected");
            return Ok(SessionChange::Ignored);
        }

        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let Some(first) = accounts.first() else {
                    return Ok(SessionChange::Ignored);
                };
                let account = canonicalize(first)?;
                self.session.set(Session {
                    account: Some(account),
                    chain_id: self.session.get().chain_id,
                });
                info!(account = %checksummed(&account), "Account changed");
                Ok(SessionChange::AccountChanged(account))
            }
            WalletEvent::ChainChanged(_) => {
                let generation = self.network_generation.get() + 1;
                self.network_generation.set(generation);

                let wallet = self.wallet()?;
                let chain_id = wallet.chain_id().await?;
                if self.network_generation.get() != generation {
                    return Ok(SessionChange::Ignored);
                }

                self.set_chain(chain_id);
                if chain_id != self.expected_chain {
                    warn!(chain_id, expected = self.expected_chain, "Wallet moved off the target network");
                }
                Ok(SessionChange::NetworkChanged(chain_id))
            }
        }
    }
}
