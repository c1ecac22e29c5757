//! Error taxonomy shared by every client action

use thiserror::Error;

use crate::wallet::ProviderFailure;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Invalid address: {0}")]
    Format(String),

    #[error("No wallet detected. Open this page in a wallet DApp browser (MetaMask/Bitget/Binance).")]
    NoWallet,

    #[error("Request rejected: {0}")]
    UserRejected(String),

    #[error("Wrong network. Please switch wallet network to {name} (chainId {expected}) then retry.")]
    WrongNetwork {
        name: &'static str,
        expected: u64,
        actual: Option<u64>,
    },

    #[error("Bad package (enum must be 1/2/3), got {0}")]
    InvalidTier(u8),

    /// Selection or session precondition; the message is shown as-is
    #[error("{0}")]
    InvalidSelection(&'static str),

    #[error("Invalid network config: {0}")]
    Config(String),

    #[error("{0}")]
    ExternalCall(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ProviderFailure> for ClientError {
    fn from(failure: ProviderFailure) -> Self {
        if failure.is_user_rejection() {
            ClientError::UserRejected(failure.best_message())
        } else {
            ClientError::ExternalCall(failure.best_message())
        }
    }
}
