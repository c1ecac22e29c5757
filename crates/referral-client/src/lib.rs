//! Client orchestration for the binary referral program
//!
//! Everything between the page and the chain lives here: address handling,
//! referral links, the user's package/sponsor/side selection, the wallet
//! session, the approve-then-buy sequence, claims, and the dashboard with its
//! maturity countdown. Browser specifics (injected provider, timers, DOM) are
//! reached only through the traits in [`wallet`] and [`countdown`].

pub mod address;
pub mod client;
pub mod config;
pub mod connection;
pub mod constants;
pub mod countdown;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod referral;
pub mod selection;
pub mod units;
pub mod wallet;

pub use client::{Client, UiHooks};
pub use config::{Contracts, NetworkConfig};
pub use connection::{ConnectionManager, ConnectionState, Session, SessionChange};
pub use countdown::{Clock, CountdownDisplay, Scheduler};
pub use dashboard::{DashboardRefresher, DashboardSnapshot};
pub use error::{ClientError, Result};
pub use model::{Rank, Side, Tier};
pub use orchestrator::{Action, Progress, TransactionOrchestrator};
pub use selection::{Selection, SelectionState};
pub use wallet::{LedgerActions, LedgerView, ProviderFailure, TxHash, WalletEvent, WalletProvider};
