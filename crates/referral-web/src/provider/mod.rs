//! Browser implementations of the client's wallet, ledger and timer seams

mod browser;
mod contracts;
mod eip1193;

pub use browser::{BrowserClock, IntervalScheduler, app_config, copy_text, navigate, page_url};
pub use contracts::RpcLedger;
pub use eip1193::InjectedWallet;
